//! Catch-up throughput: how long a frame takes to run a large tick budget.

use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use maze_runners::game::{
    clock::{ManualTimeSource, TickBudget},
    input::{Direction, InputEvent, PlayerSlot},
    maze::TileMaze,
    session::MatchSession,
};
use maze_runners::{SimConfig, FIXED_STEP_MS};

fn moving_session(maze: &Arc<TileMaze>) -> MatchSession<ManualTimeSource, maze_runners::game::entity::Runner<TileMaze>> {
    let mut session = MatchSession::for_maze(Arc::clone(maze), ManualTimeSource::new(), &SimConfig::default());
    session.apply_input(InputEvent::press(PlayerSlot::One, Direction::Left));
    session.apply_input(InputEvent::press(PlayerSlot::One, Direction::Down));
    session.apply_input(InputEvent::press(PlayerSlot::Two, Direction::Right));
    session
}

fn bench_catch_up(c: &mut Criterion) {
    let maze = Arc::new(TileMaze::classic());
    let mut group = c.benchmark_group("catch_up");

    // Ten-second stall, unbounded: 2000 steps in one frame.
    group.bench_function("unbounded_10s", |b| {
        b.iter_batched(
            || moving_session(&maze),
            |mut session| black_box(session.run_budget(TickBudget::split(10_000, FIXED_STEP_MS))),
            BatchSize::SmallInput,
        )
    });

    // Same stall under the default cap: 50 steps.
    group.bench_function("capped_10s", |b| {
        b.iter_batched(
            || moving_session(&maze),
            |mut session| black_box(session.run_budget(TickBudget::split(10_000, FIXED_STEP_MS).capped(50))),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_catch_up);
criterion_main!(benches);
