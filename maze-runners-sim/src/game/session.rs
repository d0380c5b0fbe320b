//! Match Session
//!
//! Owns everything one match needs: clock, input flags, resolver, both
//! runners and the match state. Each render frame calls `advance_frame`,
//! which runs the frame's tick budget step by step. The match state is
//! checked before every step, so nothing moves once a winner exists.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::vec2::Vec2;
use crate::game::clock::{SimulationClock, TickBudget, TimeSource};
use crate::game::entity::{Entity, Runner};
use crate::game::input::{Direction, InputEvent, InputState, IntentVector, PlayerSlot};
use crate::game::maze::TileMaze;
use crate::game::movement::MovementResolver;
use crate::game::replay::{Replay, ReplayRecorder};
use crate::game::state::MatchState;

/// What a renderer needs to draw one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameView {
    /// Frames advanced so far
    pub frame: u64,
    /// Current outcome
    pub state: MatchState,
    /// Runner positions, indexed by `PlayerSlot::index`
    pub positions: [Vec2; 2],
    /// Current intents, indexed by `PlayerSlot::index`
    pub intents: [IntentVector; 2],
}

/// Drawing surface fed once per frame.
pub trait RenderSink {
    /// Draw the current frame.
    fn present(&mut self, view: &FrameView);
}

/// Result of advancing one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number (1-based)
    pub frame: u64,
    /// Budget the frame was given
    pub budget: TickBudget,
    /// Steps actually run (fewer than budgeted if the match ended)
    pub steps_run: u64,
    /// Outcome after the frame
    pub state: MatchState,
    /// True if the match ended during this frame
    pub resolved: bool,
}

/// A running two-player match.
pub struct MatchSession<T: TimeSource, E: Entity> {
    clock: SimulationClock<T>,
    input: InputState,
    resolver: MovementResolver,
    runners: [E; 2],
    state: MatchState,
    ticks: u64,
    simulated_ms: u64,
    frames: u64,
    recorder: Option<ReplayRecorder>,
}

impl<T: TimeSource, E: Entity> MatchSession<T, E> {
    /// Assemble a session from its parts. `runners` is indexed by
    /// `PlayerSlot::index`.
    pub fn new(clock: SimulationClock<T>, resolver: MovementResolver, runners: [E; 2]) -> Self {
        Self {
            clock,
            input: InputState::new(),
            resolver,
            runners,
            state: MatchState::InProgress,
            ticks: 0,
            simulated_ms: 0,
            frames: 0,
            recorder: None,
        }
    }

    /// Record inputs and budgets so the match can be replayed.
    pub fn with_recording(mut self) -> Self {
        self.recorder = Some(ReplayRecorder::new());
        self
    }

    /// Apply a mapped key event. Takes effect from the next step.
    pub fn apply_input(&mut self, event: InputEvent) {
        self.input.apply(event);
        if let Some(recorder) = &mut self.recorder {
            recorder.push_event(event);
        }
    }

    /// Release every held control, e.g. when the window loses keyboard focus.
    /// Each release is recorded so replays see the same flags.
    pub fn release_all_input(&mut self) {
        if let Some(recorder) = &mut self.recorder {
            for player in PlayerSlot::ALL {
                for direction in Direction::ALL {
                    if self.input.is_pressed(player, direction) {
                        recorder.push_event(InputEvent::release(player, direction));
                    }
                }
            }
        }
        self.input.release_all();
        debug!("released all held controls");
    }

    /// Sample the clock and run the elapsed time as fixed steps.
    pub fn advance_frame(&mut self) -> FrameReport {
        let budget = self.clock.tick();
        self.run_budget(budget)
    }

    /// Run a given budget: full steps first, then the partial remainder.
    pub fn run_budget(&mut self, budget: TickBudget) -> FrameReport {
        if let Some(recorder) = &mut self.recorder {
            recorder.end_frame(budget);
        }
        self.frames += 1;

        let was_in_progress = self.state.is_in_progress();
        let mut steps_run = 0;
        for delta_ms in budget.steps() {
            if !self.step(delta_ms) {
                break;
            }
            steps_run += 1;
        }

        if budget.was_capped() {
            debug!(
                frame = self.frames,
                steps_run,
                dropped_ms = budget.dropped_ms,
                "catch-up capped"
            );
        }

        let resolved = was_in_progress && self.state.is_terminal();
        if resolved {
            info!(frame = self.frames, ticks = self.ticks, outcome = %self.state, "match resolved");
        }

        FrameReport {
            frame: self.frames,
            budget,
            steps_run,
            state: self.state,
            resolved,
        }
    }

    /// Run one step of `delta_ms`. Returns false, doing nothing, once the
    /// match is over.
    pub fn step(&mut self, delta_ms: u64) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.resolver.step(&self.input, delta_ms, &mut self.runners);
        self.ticks += 1;
        self.simulated_ms += delta_ms;

        let [player1, player2] = &self.runners;
        self.state.check(player1, player2);
        true
    }

    /// Current outcome.
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Current input flags.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// A player's runner.
    pub fn runner(&self, player: PlayerSlot) -> &E {
        &self.runners[player.index()]
    }

    /// Both runners, indexed by `PlayerSlot::index`.
    pub fn runners(&self) -> &[E; 2] {
        &self.runners
    }

    /// The session's clock.
    pub fn clock(&self) -> &SimulationClock<T> {
        &self.clock
    }

    /// Steps run so far, full and partial.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Milliseconds simulated so far.
    pub fn simulated_ms(&self) -> u64 {
        self.simulated_ms
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Snapshot for the renderer.
    pub fn view(&self) -> FrameView {
        FrameView {
            frame: self.frames,
            state: self.state,
            positions: [self.runners[0].position(), self.runners[1].position()],
            intents: [
                self.input.current_intent(PlayerSlot::One),
                self.input.current_intent(PlayerSlot::Two),
            ],
        }
    }

    /// Hash of tick count, outcome and positions.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.ticks, |hasher| {
            hasher.update_u8(self.state as u8);
            for runner in &self.runners {
                hasher.update_vec2(runner.position());
                hasher.update_bool(runner.has_reached_goal());
            }
        })
    }

    /// Stop recording and return the replay, stamped with the current hash.
    pub fn take_replay(&mut self) -> Option<Replay> {
        let hash = self.compute_hash();
        self.recorder.take().map(|recorder| recorder.finish(Some(hash)))
    }
}

impl<T: TimeSource> MatchSession<T, Runner<TileMaze>> {
    /// Session on a tile maze with both runners at their spawns.
    pub fn for_maze(maze: Arc<TileMaze>, source: T, config: &SimConfig) -> Self {
        let runners = PlayerSlot::ALL.map(|player| {
            Runner::new(
                Arc::clone(&maze),
                player,
                maze.spawn_point(player),
                config.runner_half_size,
            )
        });
        let clock = SimulationClock::new(source, config.fixed_step_ms, config.max_catch_up_steps);
        Self::new(clock, MovementResolver::new(config.speed_factor), runners)
    }
}

/// Headless render loop: present, run the between-frames hook (input
/// polling, yielding), advance; until the match ends or `max_frames`
/// frames have been advanced. The terminal frame is presented once.
pub fn run_frames<T, E, S, F>(
    session: &mut MatchSession<T, E>,
    sink: &mut S,
    mut between_frames: F,
    max_frames: Option<u64>,
) -> MatchState
where
    T: TimeSource,
    E: Entity,
    S: RenderSink,
    F: FnMut(&mut MatchSession<T, E>),
{
    let mut advanced = 0;
    loop {
        sink.present(&session.view());
        if session.state().is_terminal() || max_frames.is_some_and(|max| advanced >= max) {
            break;
        }
        between_frames(session);
        session.advance_frame();
        advanced += 1;
    }
    session.state()
}

// =============================================================================
// TESTS
// =============================================================================
