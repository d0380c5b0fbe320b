//! Game Logic Module
//!
//! Everything that runs a match. Given the same input events and tick
//! budgets, a session always ends in the same state.
//!
//! ## Module Structure
//!
//! - `input`: Per-player direction flags, intents and key mapping
//! - `clock`: Fixed-step simulation clock and tick budgets
//! - `maze`: Tile layouts and geometry queries
//! - `entity`: Runner bodies and wall sliding
//! - `movement`: Intent to displacement, per tick
//! - `state`: Match outcome with player 1 tie-break
//! - `session`: Frame driver tying the above together
//! - `replay`: Recording and re-simulation
//! - `autopilot`: Scripted route-following driver

pub mod input;
pub mod clock;
pub mod maze;
pub mod entity;
pub mod movement;
pub mod state;
pub mod session;
pub mod replay;
pub mod autopilot;

// Re-export key types
pub use input::{Direction, InputEvent, InputState, IntentVector, KeyMap, PlayerSlot};
pub use clock::{ManualTimeSource, SimulationClock, SystemTimeSource, TickBudget, TimeSource};
pub use maze::{Maze, MazeError, Tile, TileMaze};
pub use entity::{Entity, Runner};
pub use movement::MovementResolver;
pub use state::MatchState;
pub use session::{run_frames, FrameReport, FrameView, MatchSession, RenderSink};
pub use replay::{replay_match, Replay, ReplayError, ReplayRecorder};
pub use autopilot::Autopilot;
