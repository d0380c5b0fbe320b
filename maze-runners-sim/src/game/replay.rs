//! Match Replays
//!
//! A replay is the ordered list of input events and tick budgets a session
//! consumed. Because steps depend only on input flags and budgets, feeding
//! the same replay into a fresh session reproduces the match exactly, which
//! the final state hash verifies.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hash::StateHash;
use crate::game::clock::{TickBudget, TimeSource};
use crate::game::entity::Entity;
use crate::game::input::InputEvent;
use crate::game::session::MatchSession;

/// Replay format version.
pub const REPLAY_VERSION: u16 = 1;

/// Replay encoding and verification errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Serialization failed.
    #[error("failed to encode replay: {0}")]
    Encode(#[source] bincode::Error),

    /// Bytes are not a replay.
    #[error("failed to decode replay: {0}")]
    Decode(#[source] bincode::Error),

    /// Replay written by an incompatible version.
    #[error("replay version {found} is not supported (expected {expected})")]
    Version {
        /// Version in the replay
        found: u16,
        /// Version this build writes
        expected: u16,
    },

    /// Re-simulation diverged from the recorded match.
    #[error("replay diverged: expected hash {expected}, got {actual}")]
    HashMismatch {
        /// Recorded hash, hex
        expected: String,
        /// Re-simulated hash, hex
        actual: String,
    },
}

/// Inputs applied before one frame, and that frame's budget.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Events in arrival order
    pub events: Vec<InputEvent>,
    /// Budget the frame ran
    pub budget: TickBudget,
}

/// A recorded match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Format version
    pub version: u16,
    /// Frames in order
    pub frames: Vec<ReplayFrame>,
    /// State hash at the end of recording
    pub final_hash: Option<StateHash>,
}

impl Replay {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        bincode::serialize(self).map_err(ReplayError::Encode)
    }

    /// Decode and check the version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        let replay: Replay = bincode::deserialize(bytes).map_err(ReplayError::Decode)?;
        if replay.version != REPLAY_VERSION {
            return Err(ReplayError::Version {
                found: replay.version,
                expected: REPLAY_VERSION,
            });
        }
        Ok(replay)
    }

    /// Total input events across all frames.
    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|f| f.events.len()).sum()
    }

    /// Total simulated milliseconds across all frames.
    pub fn simulated_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.budget.simulated_ms()).sum()
    }
}

/// Collects events and budgets as a session runs.
#[derive(Clone, Debug, Default)]
pub struct ReplayRecorder {
    frames: Vec<ReplayFrame>,
    pending: Vec<InputEvent>,
}

impl ReplayRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    /// Close the current frame with its budget.
    pub fn end_frame(&mut self, budget: TickBudget) {
        self.frames.push(ReplayFrame {
            events: std::mem::take(&mut self.pending),
            budget,
        });
    }

    /// Finish recording. Trailing events land in a final empty-budget frame.
    pub fn finish(mut self, final_hash: Option<StateHash>) -> Replay {
        if !self.pending.is_empty() {
            self.end_frame(TickBudget::default());
        }
        Replay {
            version: REPLAY_VERSION,
            frames: self.frames,
            final_hash,
        }
    }
}

/// Feed a replay into a fresh session and verify the final hash.
///
/// The session's own clock is not sampled; recorded budgets are used as-is.
pub fn replay_match<T: TimeSource, E: Entity>(
    replay: &Replay,
    session: &mut MatchSession<T, E>,
) -> Result<StateHash, ReplayError> {
    for frame in &replay.frames {
        for &event in &frame.events {
            session.apply_input(event);
        }
        session.run_budget(frame.budget);
    }

    let actual = session.compute_hash();
    debug!(
        frames = replay.frames.len(),
        ticks = session.ticks(),
        hash = %hex::encode(actual),
        "replay finished"
    );

    match replay.final_hash {
        Some(expected) if expected != actual => Err(ReplayError::HashMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        }),
        _ => Ok(actual),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use crate::config::SimConfig;
    use crate::game::clock::ManualTimeSource;
    use crate::game::entity::Runner;
    use crate::game::input::{Direction, PlayerSlot};
    use crate::game::maze::TileMaze;

    type Session = MatchSession<ManualTimeSource, Runner<TileMaze>>;

    fn fresh(maze: &Arc<TileMaze>) -> (Session, ManualTimeSource) {
        let time = ManualTimeSource::new();
        let session = MatchSession::for_maze(Arc::clone(maze), time.clone(), &SimConfig::default());
        (session, time)
    }

    /// Drive a recorded session with random key events and frame times.
    fn random_match(seed: u64, frames: usize) -> Replay {
        let maze = Arc::new(TileMaze::classic());
        let (session, time) = fresh(&maze);
        let mut session = session.with_recording();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..frames {
            for _ in 0..rng.gen_range(0..3) {
                let player = if rng.gen_bool(0.5) { PlayerSlot::One } else { PlayerSlot::Two };
                let direction = Direction::ALL[rng.gen_range(0..4)];
                let event = if rng.gen_bool(0.6) {
                    InputEvent::press(player, direction)
                } else {
                    InputEvent::release(player, direction)
                };
                session.apply_input(event);
            }
            time.advance_ms(rng.gen_range(1..40));
            session.advance_frame();
        }

        session.take_replay().unwrap()
    }

    #[test]
    fn test_recorder_groups_events_by_frame() {
        let mut recorder = ReplayRecorder::new();
        let press = InputEvent::press(PlayerSlot::One, Direction::Up);
        recorder.push_event(press);
        recorder.end_frame(TickBudget::split(12, 5));
        recorder.end_frame(TickBudget::split(5, 5));
        recorder.push_event(InputEvent::release(PlayerSlot::One, Direction::Up));

        let replay = recorder.finish(None);
        assert_eq!(replay.frames.len(), 3);
        assert_eq!(replay.frames[0].events, vec![press]);
        assert!(replay.frames[1].events.is_empty());
        assert!(replay.frames[2].budget.is_empty());
        assert_eq!(replay.event_count(), 2);
        assert_eq!(replay.simulated_ms(), 17);
    }

    #[test]
    fn test_replay_reproduces_random_match() {
        let replay = random_match(7, 300);
        let bytes = replay.to_bytes().unwrap();
        let decoded = Replay::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, replay);

        let maze = Arc::new(TileMaze::classic());
        let (mut session, _time) = fresh(&maze);
        let hash = replay_match(&decoded, &mut session).unwrap();
        assert_eq!(Some(hash), replay.final_hash);
    }

    #[test]
    fn test_tampered_replay_is_detected() {
        let mut replay = random_match(11, 200);
        replay.frames.insert(
            0,
            ReplayFrame {
                events: vec![InputEvent::press(PlayerSlot::Two, Direction::Right)],
                budget: TickBudget::split(100, 5),
            },
        );

        let maze = Arc::new(TileMaze::classic());
        let (mut session, _time) = fresh(&maze);
        assert!(matches!(
            replay_match(&replay, &mut session),
            Err(ReplayError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut replay = random_match(3, 10);
        replay.version = REPLAY_VERSION + 1;
        let bytes = replay.to_bytes().unwrap();
        assert!(matches!(
            Replay::from_bytes(&bytes),
            Err(ReplayError::Version { found, expected }) if found == REPLAY_VERSION + 1 && expected == REPLAY_VERSION
        ));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(Replay::from_bytes(&[1, 2, 3]), Err(ReplayError::Decode(_))));
    }
}
