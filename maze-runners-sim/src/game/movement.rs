//! Movement Resolution
//!
//! Per tick, converts each player's intent into a displacement and hands it
//! to the entity. Collision belongs to the entity; the resolver never retries
//! or adjusts a rejected move.

use tracing::trace;

use crate::core::vec2::Vec2;
use crate::game::entity::Entity;
use crate::game::input::{InputState, IntentVector, PlayerSlot};
use crate::SPEED_FACTOR;

/// Scales intents into per-tick displacements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementResolver {
    speed_factor: f32,
}

impl Default for MovementResolver {
    fn default() -> Self {
        Self::new(SPEED_FACTOR)
    }
}

impl MovementResolver {
    /// Create with a speed factor in maze units per millisecond.
    pub const fn new(speed_factor: f32) -> Self {
        Self { speed_factor }
    }

    /// Maze units per millisecond for a held direction.
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// `intent * delta_ms * speed_factor`, per axis.
    #[inline]
    pub fn displacement(&self, intent: IntentVector, delta_ms: u64) -> Vec2 {
        intent.to_vec2().scale(delta_ms as f32 * self.speed_factor)
    }

    /// Advance both players by one tick of `delta_ms`.
    ///
    /// Players are processed in slot order. Idle players are skipped
    /// entirely. Returns the number of move attempts issued.
    pub fn step<E: Entity>(&self, input: &InputState, delta_ms: u64, runners: &mut [E; 2]) -> usize {
        let mut attempts = 0;
        for player in PlayerSlot::ALL {
            let intent = input.current_intent(player);
            if intent.is_idle() {
                continue;
            }

            let d = self.displacement(intent, delta_ms);
            let moved = runners[player.index()].attempt_move(d.x, d.y);
            trace!(%player, dx = d.x, dy = d.y, moved, "move attempt");
            attempts += 1;
        }
        attempts
    }
}

// =============================================================================
// TESTS
// =============================================================================
