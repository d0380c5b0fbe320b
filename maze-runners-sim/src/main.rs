//! Maze Runners Headless Race
//!
//! Runs two autopilot bots against each other without a window, then
//! re-simulates the recorded replay and checks the state hash matches.
//!
//! ```text
//! maze-runners-sim [CONFIG.json] [--realtime] [--stagger N] [--replay-out PATH]
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use maze_runners::{
    SimConfig, VERSION,
    game::{
        autopilot::Autopilot,
        clock::{ManualTimeSource, SystemTimeSource, TimeSource},
        entity::{Entity, Runner},
        input::PlayerSlot,
        maze::TileMaze,
        replay::{replay_match, Replay},
        session::{run_frames, FrameView, MatchSession, RenderSink},
        state::MatchState,
    },
};

/// Give up after this many frames.
const MAX_FRAMES: u64 = 200_000;

/// Simulated frame times, cycled.
const FRAME_PATTERN_MS: [u64; 5] = [16, 17, 16, 33, 5];

/// Every this many frames the simulated clock stalls.
const STALL_EVERY: u64 = 400;

/// Length of a simulated stall.
const STALL_MS: u64 = 400;

/// Command-line options.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    realtime: bool,
    stagger: u64,
    replay_out: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--realtime" => parsed.realtime = true,
                "--stagger" => {
                    let value = args.next().context("--stagger needs a frame count")?;
                    parsed.stagger = value
                        .parse()
                        .with_context(|| format!("invalid --stagger value {value:?}"))?;
                }
                "--replay-out" => {
                    let value = args.next().context("--replay-out needs a path")?;
                    parsed.replay_out = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                path => {
                    if parsed.config.replace(PathBuf::from(path)).is_some() {
                        bail!("more than one config path given");
                    }
                }
            }
        }
        Ok(parsed)
    }
}

/// Logs progress instead of drawing.
struct LogSink {
    every: u64,
}

impl RenderSink for LogSink {
    fn present(&mut self, view: &FrameView) {
        if view.state.is_terminal() {
            info!(
                frame = view.frame,
                p1 = %view.positions[0],
                p2 = %view.positions[1],
                "{}", view.state
            );
        } else if view.frame % self.every == 0 {
            debug!(frame = view.frame, p1 = %view.positions[0], p2 = %view.positions[1], "race");
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let args = Args::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let maze = Arc::new(match &config.maze_path {
        Some(path) => TileMaze::load(path)
            .with_context(|| format!("loading maze {}", path.display()))?,
        None => TileMaze::classic(),
    });

    info!("Maze Runners v{}", VERSION);
    info!(
        step_ms = config.fixed_step_ms,
        speed = config.speed_factor,
        cap = ?config.max_catch_up_steps,
        "simulation config"
    );

    let pilots = PlayerSlot::ALL
        .map(|player| Autopilot::plan(&maze, player).with_context(|| format!("no route for {player}")));
    let [p1, p2] = pilots;
    let mut pilots = [p1?, p2?];
    for pilot in &pilots {
        info!("{} route: {} tiles", pilot.player(), pilot.route().len());
    }

    let (outcome, replay) = if args.realtime {
        let yield_for = Duration::from_millis(config.frame_yield_ms);
        let session = MatchSession::for_maze(Arc::clone(&maze), SystemTimeSource::new(), &config);
        race(session, &mut pilots, args.stagger, |_| thread::sleep(yield_for))?
    } else {
        let time = ManualTimeSource::new();
        let session = MatchSession::for_maze(Arc::clone(&maze), time.clone(), &config);
        race(session, &mut pilots, args.stagger, |frame| time.advance_ms(simulated_frame_ms(frame)))?
    };

    let expected = replay.final_hash.context("replay has no final hash")?;
    info!("=== Match Results ===");
    info!("Outcome: {outcome}");
    info!("Frames: {}, events: {}", replay.frames.len(), replay.event_count());
    info!("Final State Hash: {}", hex::encode(expected));

    let bytes = replay.to_bytes().context("encoding replay")?;
    if let Some(path) = &args.replay_out {
        std::fs::write(path, &bytes)
            .with_context(|| format!("writing replay {}", path.display()))?;
        info!("Replay written to {} ({} bytes)", path.display(), bytes.len());
    }

    // Verify determinism by replaying
    info!("=== Verifying Replay ===");
    let decoded = Replay::from_bytes(&bytes).context("decoding replay")?;
    let mut fresh = MatchSession::for_maze(Arc::clone(&maze), ManualTimeSource::new(), &config);
    let replayed = replay_match(&decoded, &mut fresh).context("replay verification failed")?;
    info!("Replay State Hash: {}", hex::encode(replayed));
    info!("REPLAY VERIFIED: {} after {} ticks", fresh.state(), fresh.ticks());

    Ok(())
}

/// Drive both bots until someone wins, recording a replay.
fn race<T: TimeSource>(
    session: MatchSession<T, Runner<TileMaze>>,
    pilots: &mut [Autopilot; 2],
    stagger: u64,
    mut wait: impl FnMut(u64),
) -> Result<(MatchState, Replay)> {
    let mut session = session.with_recording();
    let mut sink = LogSink { every: 250 };

    let outcome = run_frames(
        &mut session,
        &mut sink,
        |session| {
            for pilot in pilots.iter_mut() {
                if pilot.player() == PlayerSlot::One && session.frames() < stagger {
                    continue;
                }
                let position = session.runner(pilot.player()).position();
                for event in pilot.steer(position, session.input()) {
                    session.apply_input(event);
                }
            }
            wait(session.frames());
        },
        Some(MAX_FRAMES),
    );

    if outcome.is_in_progress() {
        bail!("no winner after {MAX_FRAMES} frames");
    }
    let replay = session.take_replay().context("session was not recording")?;
    Ok((outcome, replay))
}

fn simulated_frame_ms(frame: u64) -> u64 {
    if frame % STALL_EVERY == STALL_EVERY - 1 {
        STALL_MS
    } else {
        FRAME_PATTERN_MS[(frame % FRAME_PATTERN_MS.len() as u64) as usize]
    }
}
