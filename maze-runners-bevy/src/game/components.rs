//! Board components and maze-to-screen mapping

use bevy::prelude::*;
use maze_runners::{PlayerSlot, Vec2 as MazeVec2};

/// Screen size of one maze tile, in pixels.
pub const TILE_PX: f32 = 40.0;

// ============================================================================
// COLORS
// ============================================================================

/// Wall tiles
pub const WALL_COLOR: Color = Color::srgb(0.18, 0.2, 0.3);

/// Floor tiles
pub const FLOOR_COLOR: Color = Color::srgb(0.06, 0.06, 0.09);

/// Runner and goal tint per player.
pub fn player_color(player: PlayerSlot) -> Color {
    match player {
        PlayerSlot::One => Color::srgb(0.35, 0.7, 1.0),
        PlayerSlot::Two => Color::srgb(1.0, 0.6, 0.25),
    }
}

// ============================================================================
// ANIMATION
// ============================================================================

/// Scale swing of a runner whose controls are held.
pub const STRIDE_AMPLITUDE: f32 = 0.08;

/// Stride pulses per second, in radians.
pub const STRIDE_RATE: f32 = 12.0;

/// Sprite scale for a runner: pulsing while any control is held, at rest
/// otherwise.
pub fn stride_scale(moving: bool, elapsed_secs: f32) -> f32 {
    if moving {
        1.0 + STRIDE_AMPLITUDE * (elapsed_secs * STRIDE_RATE).sin()
    } else {
        1.0
    }
}

// ============================================================================
// MARKERS
// ============================================================================

/// Anything spawned for the board; despawned together.
#[derive(Component)]
pub struct BoardEntity;

/// A runner's sprite.
#[derive(Component)]
pub struct RunnerSprite {
    pub player: PlayerSlot,
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Maze grid size, used to centre the board on screen.
#[derive(Resource, Clone, Copy, Debug)]
pub struct BoardLayout {
    pub columns: usize,
    pub rows: usize,
}

impl BoardLayout {
    /// World position of a maze-space point. Maze y grows down, world y up.
    pub fn to_world(&self, point: MazeVec2) -> Vec2 {
        Vec2::new(
            (point.x - self.columns as f32 / 2.0) * TILE_PX,
            (self.rows as f32 / 2.0 - point.y) * TILE_PX,
        )
    }

    /// World position of a tile's centre.
    pub fn tile_to_world(&self, tx: usize, ty: usize) -> Vec2 {
        self.to_world(MazeVec2::tile_center(tx, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_is_centred() {
        let layout = BoardLayout { columns: 21, rows: 17 };
        assert_eq!(layout.to_world(MazeVec2::new(10.5, 8.5)), Vec2::ZERO);
        assert_eq!(layout.tile_to_world(0, 0), Vec2::new(-10.0 * TILE_PX, 8.0 * TILE_PX));
    }

    #[test]
    fn test_idle_runner_stays_at_rest() {
        for t in [0.0, 0.13, 0.5, 2.0] {
            assert_eq!(stride_scale(false, t), 1.0);
            let moving = stride_scale(true, t);
            assert!((moving - 1.0).abs() <= STRIDE_AMPLITUDE + f32::EPSILON);
        }
        assert!(stride_scale(true, 0.13) > 1.0);
    }
}
