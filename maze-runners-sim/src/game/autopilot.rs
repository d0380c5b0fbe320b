//! Autopilot
//!
//! Scripted driver for headless matches and tests. Plans a tile route from
//! spawn to goal with a breadth-first search, then steers by pressing and
//! releasing direction keys toward successive tile centres, exactly like a
//! player at the keyboard would.

use std::collections::VecDeque;

use crate::core::vec2::Vec2;
use crate::game::input::{Direction, InputEvent, InputState, PlayerSlot};
use crate::game::maze::{Maze, TileMaze};

/// Distance from a tile centre at which a waypoint counts as reached.
///
/// A long frame can carry the runner straight through this window. The
/// waypoint then stays pending, so the next `steer` presses back toward the
/// missed centre and the runner returns to it before moving on.
pub const ARRIVAL_TOLERANCE: f32 = 0.06;

/// Shortest walkable tile path from `start` to `goal`, both inclusive.
pub fn find_route(maze: &TileMaze, start: (usize, usize), goal: (usize, usize)) -> Option<Vec<(usize, usize)>> {
    let (width, height) = maze.dimensions();
    let index = |(x, y): (usize, usize)| y * width + x;

    if start.0 >= width || start.1 >= height {
        return None;
    }

    let mut came_from: Vec<Option<(usize, usize)>> = vec![None; width * height];
    let mut visited = vec![false; width * height];
    let mut frontier = VecDeque::from([start]);
    visited[index(start)] = true;

    while let Some(tile) = frontier.pop_front() {
        if tile == goal {
            let mut route = vec![goal];
            let mut cursor = goal;
            while let Some(prev) = came_from[index(cursor)] {
                route.push(prev);
                cursor = prev;
            }
            route.reverse();
            return Some(route);
        }

        for next in maze.walkable_neighbours(tile) {
            if !visited[index(next)] {
                visited[index(next)] = true;
                came_from[index(next)] = Some(tile);
                frontier.push_back(next);
            }
        }
    }
    None
}

/// Steers one runner along a planned route.
#[derive(Clone, Debug)]
pub struct Autopilot {
    player: PlayerSlot,
    route: Vec<(usize, usize)>,
    next: usize,
}

impl Autopilot {
    /// Plan a route from the player's spawn to its goal.
    pub fn plan(maze: &TileMaze, player: PlayerSlot) -> Option<Self> {
        let route = find_route(maze, maze.spawn_tile(player), maze.goal_tile(player))?;
        Some(Self { player, route, next: 0 })
    }

    /// Player being driven.
    pub fn player(&self) -> PlayerSlot {
        self.player
    }

    /// Planned tiles, spawn first.
    pub fn route(&self) -> &[(usize, usize)] {
        &self.route
    }

    /// Waypoints not yet reached.
    pub fn remaining(&self) -> usize {
        self.route.len() - self.next
    }

    /// Key changes needed this frame, given the runner's position and the
    /// currently held keys.
    pub fn steer(&mut self, position: Vec2, input: &InputState) -> Vec<InputEvent> {
        while let Some(&(tx, ty)) = self.route.get(self.next) {
            let offset = Vec2::tile_center(tx, ty) - position;
            if offset.x.abs() > ARRIVAL_TOLERANCE || offset.y.abs() > ARRIVAL_TOLERANCE {
                break;
            }
            self.next += 1;
        }

        let wanted = match self.route.get(self.next) {
            Some(&(tx, ty)) => desired_keys(Vec2::tile_center(tx, ty) - position),
            None => [false; 4],
        };

        Direction::ALL
            .iter()
            .zip(wanted)
            .filter(|&(&direction, want)| input.is_pressed(self.player, direction) != want)
            .map(|(&direction, want)| {
                if want {
                    InputEvent::press(self.player, direction)
                } else {
                    InputEvent::release(self.player, direction)
                }
            })
            .collect()
    }
}

/// Held state per `Direction::ALL` entry for a given offset to the target.
fn desired_keys(offset: Vec2) -> [bool; 4] {
    Direction::ALL.map(|direction| {
        let (ux, uy) = direction.unit();
        let along = offset.x * ux as f32 + offset.y * uy as f32;
        along > ARRIVAL_TOLERANCE
    })
}

// =============================================================================
// TESTS
// =============================================================================
