//! Simulation Clock
//!
//! Turns variable wall-clock frame time into a bounded number of fixed-size
//! simulation ticks. Each frame consumes the elapsed milliseconds since the
//! previous sample and splits them into `count` full steps plus a partial
//! remainder step.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use serde::{Serialize, Deserialize};
use tracing::warn;

// =============================================================================
// TIME SOURCES
// =============================================================================

/// Monotonic time samples measured from an arbitrary origin.
pub trait TimeSource {
    /// Current sample. Implementations should never go backward, but the
    /// clock tolerates it.
    fn now(&self) -> Duration;
}

/// Wall-clock source backed by `Instant`.
#[derive(Clone, Copy, Debug)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Start measuring from now.
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually driven source for tests, replays and headless runs.
///
/// Clones share the same underlying time, so a driver can keep a handle and
/// advance it while the clock owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    /// Start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward by whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Set an absolute time, which may be earlier than the current one.
    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// =============================================================================
// TICK BUDGET
// =============================================================================

/// Elapsed frame time split into fixed steps.
///
/// `count * step_ms + remainder_ms + dropped_ms` always equals the elapsed
/// time the budget was built from. `dropped_ms` is non-zero only when the
/// catch-up cap discarded time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickBudget {
    /// Number of full steps
    pub count: u64,
    /// Size of a full step in milliseconds
    pub step_ms: u64,
    /// Partial step run once after the full steps (always `< step_ms`)
    pub remainder_ms: u64,
    /// Time discarded by the catch-up cap
    pub dropped_ms: u64,
}

impl TickBudget {
    /// Split elapsed milliseconds into full steps and a remainder.
    ///
    /// `step_ms` must be non-zero.
    pub fn split(elapsed_ms: u64, step_ms: u64) -> Self {
        debug_assert!(step_ms > 0, "fixed step must be non-zero");
        let step_ms = step_ms.max(1);
        Self {
            count: elapsed_ms / step_ms,
            step_ms,
            remainder_ms: elapsed_ms % step_ms,
            dropped_ms: 0,
        }
    }

    /// Limit the number of full steps. A capped budget also drops its
    /// remainder, so the frame runs exactly `max_steps` full steps.
    pub fn capped(self, max_steps: u64) -> Self {
        if self.count <= max_steps {
            return self;
        }
        let excess = self.count - max_steps;
        Self {
            count: max_steps,
            step_ms: self.step_ms,
            remainder_ms: 0,
            dropped_ms: self.dropped_ms + excess * self.step_ms + self.remainder_ms,
        }
    }

    /// Total time this budget accounts for, including dropped time.
    pub fn elapsed_ms(&self) -> u64 {
        self.count * self.step_ms + self.remainder_ms + self.dropped_ms
    }

    /// Time that will actually be simulated.
    pub fn simulated_ms(&self) -> u64 {
        self.count * self.step_ms + self.remainder_ms
    }

    /// True when the catch-up cap discarded time.
    pub fn was_capped(&self) -> bool {
        self.dropped_ms > 0
    }

    /// True when no step will run.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.remainder_ms == 0
    }

    /// Step sizes in execution order: `count` full steps, then the
    /// remainder if non-zero.
    pub fn steps(&self) -> impl Iterator<Item = u64> {
        let full = std::iter::repeat(self.step_ms).take(self.count as usize);
        let partial = (self.remainder_ms != 0).then_some(self.remainder_ms);
        full.chain(partial)
    }
}

// =============================================================================
// SIMULATION CLOCK
// =============================================================================

/// Converts elapsed time since the last frame into a `TickBudget`.
#[derive(Debug)]
pub struct SimulationClock<T: TimeSource> {
    source: T,
    last_sample: Duration,
    step_ms: u64,
    max_steps: Option<u64>,
}

impl<T: TimeSource> SimulationClock<T> {
    /// Create a clock. The first `tick` measures from this moment.
    ///
    /// `max_steps` caps full steps per frame; `None` leaves catch-up
    /// unbounded.
    pub fn new(source: T, step_ms: u64, max_steps: Option<u64>) -> Self {
        let last_sample = source.now();
        Self {
            source,
            last_sample,
            step_ms: step_ms.max(1),
            max_steps,
        }
    }

    /// Current monotonic sample.
    pub fn now(&self) -> Duration {
        self.source.now()
    }

    /// Size of a full step in milliseconds.
    pub fn step_ms(&self) -> u64 {
        self.step_ms
    }

    /// Full-step cap per frame.
    pub fn max_steps(&self) -> Option<u64> {
        self.max_steps
    }

    /// Budget for the time elapsed since `previous_sample`.
    ///
    /// A source that went backward yields an empty budget.
    pub fn consume_elapsed(&self, previous_sample: Duration) -> TickBudget {
        let elapsed = self.now().saturating_sub(previous_sample);
        self.budget_for(whole_millis(elapsed))
    }

    /// Sample the source, consume the time since the previous sample and
    /// advance the sample marker.
    pub fn tick(&mut self) -> TickBudget {
        let now = self.now();
        if now < self.last_sample {
            // Re-anchor so the next frame measures from the new timeline.
            self.last_sample = now;
            return TickBudget::split(0, self.step_ms);
        }

        let elapsed_ms = whole_millis(now - self.last_sample);
        // Only whole milliseconds are consumed; the fraction carries over.
        self.last_sample += Duration::from_millis(elapsed_ms);
        self.budget_for(elapsed_ms)
    }

    fn budget_for(&self, elapsed_ms: u64) -> TickBudget {
        let budget = TickBudget::split(elapsed_ms, self.step_ms);
        match self.max_steps {
            Some(max) if budget.count > max => {
                let capped = budget.capped(max);
                warn!(
                    elapsed_ms,
                    dropped_ms = capped.dropped_ms,
                    max_steps = max,
                    "frame stalled, dropping catch-up time"
                );
                capped
            }
            _ => budget,
        }
    }
}

fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FIXED_STEP_MS;
    use proptest::prelude::*;

    #[test]
    fn test_split_twelve_ms() {
        let budget = TickBudget::split(12, FIXED_STEP_MS);
        assert_eq!(budget.count, 2);
        assert_eq!(budget.remainder_ms, 2);
        assert_eq!(budget.steps().collect::<Vec<_>>(), vec![5, 5, 2]);
    }

    #[test]
    fn test_split_exact_multiple_has_no_partial() {
        let budget = TickBudget::split(15, FIXED_STEP_MS);
        assert_eq!(budget.steps().collect::<Vec<_>>(), vec![5, 5, 5]);
        assert!(TickBudget::split(0, FIXED_STEP_MS).is_empty());
    }

    #[test]
    fn test_cap_drops_excess_and_remainder() {
        let budget = TickBudget::split(1_003, 5).capped(50);
        assert_eq!(budget.count, 50);
        assert_eq!(budget.remainder_ms, 0);
        assert_eq!(budget.dropped_ms, 753);
        assert_eq!(budget.elapsed_ms(), 1_003);
        assert_eq!(budget.simulated_ms(), 250);
        assert!(budget.was_capped());

        let small = TickBudget::split(12, 5).capped(50);
        assert!(!small.was_capped());
        assert_eq!(small, TickBudget::split(12, 5));
    }

    #[test]
    fn test_clock_tick_consumes_since_last_sample() {
        let time = ManualTimeSource::new();
        let mut clock = SimulationClock::new(time.clone(), FIXED_STEP_MS, None);

        time.advance_ms(12);
        let budget = clock.tick();
        assert_eq!((budget.count, budget.remainder_ms), (2, 2));

        // Nothing elapsed since the previous tick.
        assert!(clock.tick().is_empty());

        time.advance_ms(7);
        let budget = clock.tick();
        assert_eq!((budget.count, budget.remainder_ms), (1, 2));
    }

    #[test]
    fn test_clock_carries_sub_millisecond_fraction() {
        let time = ManualTimeSource::new();
        let mut clock = SimulationClock::new(time.clone(), FIXED_STEP_MS, None);

        time.advance(Duration::from_micros(4_600));
        assert_eq!(clock.tick().elapsed_ms(), 4);
        time.advance(Duration::from_micros(4_600));
        // 9.2 ms total, 4 already consumed.
        assert_eq!(clock.tick().elapsed_ms(), 5);
    }

    #[test]
    fn test_clock_backward_is_clamped() {
        let time = ManualTimeSource::new();
        time.set(Duration::from_millis(100));
        let mut clock = SimulationClock::new(time.clone(), FIXED_STEP_MS, None);

        time.set(Duration::from_millis(40));
        assert!(clock.tick().is_empty());
        assert!(clock.consume_elapsed(Duration::from_millis(100)).is_empty());

        // Measures from the re-anchored sample, not the old one.
        time.set(Duration::from_millis(50));
        assert_eq!(clock.tick().elapsed_ms(), 10);
    }

    #[test]
    fn test_clock_caps_large_stall() {
        let time = ManualTimeSource::new();
        let mut clock = SimulationClock::new(time.clone(), FIXED_STEP_MS, Some(50));

        time.advance(Duration::from_secs(10));
        let budget = clock.tick();
        assert_eq!(budget.count, 50);
        assert_eq!(budget.elapsed_ms(), 10_000);

        let unbounded = SimulationClock::new(time.clone(), FIXED_STEP_MS, None);
        let previous = unbounded.now();
        time.advance(Duration::from_secs(10));
        let budget = unbounded.consume_elapsed(previous);
        assert_eq!(budget.count, 2_000);
    }

    proptest! {
        #[test]
        fn prop_split_accounts_for_all_time(elapsed in 0u64..20_000, step in 1u64..100) {
            let budget = TickBudget::split(elapsed, step);
            prop_assert_eq!(budget.count * step + budget.remainder_ms, elapsed);
            prop_assert!(budget.remainder_ms < step);
            prop_assert_eq!(budget.steps().map(|s| s as u128).sum::<u128>(), elapsed as u128);
        }

        #[test]
        fn prop_capped_budget_is_bounded(elapsed in 0u64..10_000_000, cap in 0u64..500) {
            let budget = TickBudget::split(elapsed, FIXED_STEP_MS).capped(cap);
            prop_assert!(budget.count <= cap);
            prop_assert!(budget.remainder_ms < FIXED_STEP_MS);
            prop_assert_eq!(budget.elapsed_ms(), elapsed);
        }
    }
}
