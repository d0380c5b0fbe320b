//! Runner Entities
//!
//! The `Entity` trait is the move-attempt seam between the simulation and
//! collision. `Runner` is the tile-maze implementation: an axis-aligned
//! square body that slides along walls.

use std::sync::Arc;

use crate::core::vec2::Vec2;
use crate::game::input::{Direction, PlayerSlot};
use crate::game::maze::Maze;

/// Default half extent of a runner body, in tiles.
pub const RUNNER_HALF_SIZE: f32 = 0.3;

/// A movable body that owns its position and collision handling.
pub trait Entity {
    /// Apply as much of a displacement as the geometry allows.
    ///
    /// Returns whether the body moved at all. A blocked move is a normal
    /// outcome, not an error.
    fn attempt_move(&mut self, dx: f32, dy: f32) -> bool;

    /// True once the body stands on its goal.
    fn has_reached_goal(&self) -> bool;

    /// Current position in maze units.
    fn position(&self) -> Vec2;
}

/// A player's body in a maze.
#[derive(Debug)]
pub struct Runner<M: Maze> {
    maze: Arc<M>,
    player: PlayerSlot,
    position: Vec2,
    half_size: f32,
    facing: Direction,
}

impl<M: Maze> Clone for Runner<M> {
    fn clone(&self) -> Self {
        Self {
            maze: Arc::clone(&self.maze),
            player: self.player,
            position: self.position,
            half_size: self.half_size,
            facing: self.facing,
        }
    }
}

impl<M: Maze> Runner<M> {
    /// Place a runner. The caller picks a free starting position.
    pub fn new(maze: Arc<M>, player: PlayerSlot, position: Vec2, half_size: f32) -> Self {
        Self {
            maze,
            player,
            position,
            half_size,
            facing: Direction::Down,
        }
    }

    /// Which player this body belongs to.
    pub fn player(&self) -> PlayerSlot {
        self.player
    }

    /// Direction of the most recent move attempt.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Half extent of the body, in tiles.
    pub fn half_size(&self) -> f32 {
        self.half_size
    }

    /// The maze this runner moves through.
    pub fn maze(&self) -> &Arc<M> {
        &self.maze
    }

    /// True when no corner of the body would overlap a wall at `(x, y)`.
    pub fn fits_at(&self, x: f32, y: f32) -> bool {
        let s = self.half_size;
        !(self.maze.is_blocked(x - s, y - s)
            || self.maze.is_blocked(x + s, y - s)
            || self.maze.is_blocked(x - s, y + s)
            || self.maze.is_blocked(x + s, y + s))
    }

    fn try_to(&mut self, x: f32, y: f32) -> bool {
        if self.fits_at(x, y) {
            self.position = Vec2::new(x, y);
            true
        } else {
            false
        }
    }
}

impl<M: Maze> Entity for Runner<M> {
    fn attempt_move(&mut self, dx: f32, dy: f32) -> bool {
        if let Some(facing) = facing_for(Vec2::new(dx, dy)) {
            self.facing = facing;
        }

        let Vec2 { x, y } = self.position;
        // Full move, else slide along whichever axis is free.
        self.try_to(x + dx, y + dy)
            || (dx != 0.0 && self.try_to(x + dx, y))
            || (dy != 0.0 && self.try_to(x, y + dy))
    }

    fn has_reached_goal(&self) -> bool {
        self.maze.is_goal(self.player, self.position.x, self.position.y)
    }

    fn position(&self) -> Vec2 {
        self.position
    }
}

/// Dominant axis of a move; horizontal wins a diagonal.
fn facing_for(delta: Vec2) -> Option<Direction> {
    if delta.is_zero() {
        return None;
    }
    Some(if delta.x.abs() >= delta.y.abs() {
        if delta.x > 0.0 { Direction::Right } else { Direction::Left }
    } else if delta.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::maze::TileMaze;

    const CORRIDOR: &str = "\
#######
#1...A#
#.#####
#2...B#
#######";

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance_squared(expected) < 1e-10,
            "expected {expected}, got {actual}"
        );
    }

    fn runner(player: PlayerSlot) -> Runner<TileMaze> {
        let maze = Arc::new(TileMaze::parse(CORRIDOR).unwrap());
        let spawn = maze.spawn_point(player);
        Runner::new(maze, player, spawn, RUNNER_HALF_SIZE)
    }

    #[test]
    fn test_free_move_applies_exactly() {
        let mut r = runner(PlayerSlot::One);
        assert!(r.attempt_move(0.015, 0.0));
        assert_near(r.position(), Vec2::new(1.515, 1.5));
        assert_eq!(r.facing(), Direction::Right);
    }

    #[test]
    fn test_blocked_move_is_absorbed() {
        let mut r = runner(PlayerSlot::One);
        // Wall directly above row 1.
        assert!(!r.attempt_move(0.0, -0.5));
        assert_eq!(r.position(), Vec2::new(1.5, 1.5));
        assert_eq!(r.facing(), Direction::Up);
    }

    #[test]
    fn test_zero_move_keeps_facing() {
        let mut r = runner(PlayerSlot::One);
        r.attempt_move(-0.01, 0.0);
        assert_eq!(r.facing(), Direction::Left);
        r.attempt_move(0.0, 0.0);
        assert_eq!(r.facing(), Direction::Left);
        // Horizontal wins a diagonal, including an even one.
        r.attempt_move(0.01, 0.01);
        assert_eq!(r.facing(), Direction::Right);
        r.attempt_move(0.001, 0.01);
        assert_eq!(r.facing(), Direction::Down);
    }

    #[test]
    fn test_diagonal_slides_along_wall() {
        let mut r = runner(PlayerSlot::One);
        assert!(r.attempt_move(0.1, -0.5));
        assert_near(r.position(), Vec2::new(1.6, 1.5));
    }

    #[test]
    fn test_goal_reached_only_on_own_goal() {
        let mut r = runner(PlayerSlot::One);
        assert!(!r.has_reached_goal());
        for _ in 0..400 {
            r.attempt_move(0.015, 0.0);
        }
        // Stopped by the east wall inside the goal tile.
        assert!(r.position().x > 5.0 && r.position().x < 6.0);
        assert!(r.has_reached_goal());

        let mut other = runner(PlayerSlot::Two);
        for _ in 0..400 {
            other.attempt_move(0.015, 0.0);
        }
        assert!(other.has_reached_goal());
        assert!(!runner(PlayerSlot::Two).has_reached_goal());
    }

    #[test]
    fn test_body_does_not_enter_wall() {
        let mut r = runner(PlayerSlot::One);
        for _ in 0..1000 {
            r.attempt_move(-0.015, 0.0);
        }
        assert!(r.position().x - RUNNER_HALF_SIZE >= 1.0);
        assert!(r.fits_at(r.position().x, r.position().y));
    }
}
