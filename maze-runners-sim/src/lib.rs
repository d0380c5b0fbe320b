//! # Maze Runners Simulation
//!
//! Two-player same-screen maze race. Both players steer a runner through a
//! shared tile maze with their own set of direction keys; the first to reach
//! their goal wins.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MAZE RUNNERS SIM                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - Maze-space 2D vector                      │
//! │  └── hash.rs     - State hashing for replay verification     │
//! │                                                              │
//! │  game/           - Match logic                               │
//! │  ├── input.rs    - Direction flags, intents, key maps        │
//! │  ├── clock.rs    - Fixed-step clock and tick budgets         │
//! │  ├── maze.rs     - Tile layouts                              │
//! │  ├── entity.rs   - Runner bodies and collision               │
//! │  ├── movement.rs - Per-tick displacement                     │
//! │  ├── state.rs    - Match outcome                             │
//! │  ├── session.rs  - Frame driver and render seam              │
//! │  ├── replay.rs   - Recording and re-simulation               │
//! │  └── autopilot.rs- Route-following bot                       │
//! │                                                              │
//! │  config.rs       - JSON tunables                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Loop
//!
//! Each frame the session samples the clock, splits the elapsed whole
//! milliseconds into `FIXED_STEP_MS` steps plus a partial remainder, and
//! runs them in order. The match state is checked before and after every
//! step, so once a goal is reached nothing moves again.
//!
//! A step depends only on the held direction flags and its length, so the
//! same input events and budgets always reproduce the same match.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, SimConfig};
pub use core::vec2::Vec2;
pub use game::input::{Direction, InputEvent, InputState, IntentVector, KeyMap, PlayerSlot};
pub use game::session::{MatchSession, RenderSink};
pub use game::state::MatchState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of one full simulation step (ms)
pub const FIXED_STEP_MS: u64 = 5;

/// Maze units moved per millisecond while a direction is held
pub const SPEED_FACTOR: f32 = 0.003;

/// Default cap on full steps per frame (250 ms of catch-up)
pub const MAX_CATCH_UP_STEPS: u64 = 50;

/// Pause between frames in the headless real-time driver (ms)
pub const FRAME_YIELD_MS: u64 = 5;
