//! Frame clock with fixed-timestep accumulator
//!
//! Time is read through a [`TimeSource`] so the loop can run against the
//! monotonic system clock or against a manually advanced clock in tests.

use lightdrive_core::{LightDriveError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slack when deciding whether a whole tick is due, absorbing integer
/// nanosecond rounding of the tick period
pub const TICK_TOLERANCE: f64 = 1e-6;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Source of monotonic time for the loop.
pub trait TimeSource: Send + Sync {
    /// Nanoseconds since an arbitrary fixed origin
    fn now_ns(&self) -> u64;

    /// Milliseconds since the same origin as `now_ns`
    fn now_ms(&self) -> u64 {
        self.now_ns() / 1_000_000
    }

    fn sleep(&self, duration: Duration);
}

/// `Instant`-based clock, unaffected by wall-clock adjustments
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicClock {
    fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually advanced clock. Clones share the same time; `sleep` advances it
/// instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ns: u64) -> Self {
        let clock = Self::new();
        clock.set_ns(ns);
        clock
    }

    pub fn advance(&self, duration: Duration) {
        self.advance_ns(duration.as_nanos() as u64);
    }

    pub fn advance_ns(&self, ns: u64) {
        self.now.fetch_add(ns, Ordering::AcqRel);
    }

    pub fn set_ns(&self, ns: u64) {
        self.now.store(ns, Ordering::Release);
    }
}

impl TimeSource for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Converts elapsed time between samples into fractional ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    ticks_per_second: f64,
    ns_per_tick: f64,
    last_ns: u64,
}

impl FrameClock {
    pub fn new(ticks_per_second: f64) -> Result<Self> {
        if !ticks_per_second.is_finite() || ticks_per_second <= 0.0 {
            return Err(LightDriveError::Config(format!(
                "target_ticks_per_second must be a positive finite number, got {ticks_per_second}"
            )));
        }
        Ok(Self {
            ticks_per_second,
            ns_per_tick: NANOS_PER_SECOND / ticks_per_second,
            last_ns: 0,
        })
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    pub fn ns_per_tick(&self) -> f64 {
        self.ns_per_tick
    }

    /// Start measuring from `now_ns`
    pub fn reset(&mut self, now_ns: u64) {
        self.last_ns = now_ns;
    }

    /// Ticks elapsed since the previous sample; `now_ns` becomes the new
    /// sample. A sample earlier than the previous one yields zero.
    pub fn elapsed_ticks(&mut self, now_ns: u64) -> f64 {
        let elapsed = now_ns.saturating_sub(self.last_ns);
        self.last_ns = now_ns;
        elapsed as f64 / self.ns_per_tick
    }
}

/// Fractional ticks owed to the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickAccumulator {
    accumulated: f64,
}

impl TickAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ticks: f64) {
        if ticks.is_finite() && ticks > 0.0 {
            self.accumulated += ticks;
        }
    }

    pub fn pending(&self) -> f64 {
        self.accumulated
    }

    /// Whether at least one whole tick (within tolerance) is owed
    pub fn is_due(&self) -> bool {
        self.accumulated + TICK_TOLERANCE >= 1.0
    }

    /// Take one tick if due
    pub fn consume(&mut self) -> bool {
        if !self.is_due() {
            return false;
        }
        // A tick taken within tolerance leaves a tiny deficit; drop it.
        self.accumulated = (self.accumulated - 1.0).max(0.0);
        true
    }

    /// Drop every whole tick still owed, keeping the fraction.
    /// Returns the number of ticks dropped.
    pub fn discard_whole(&mut self) -> u64 {
        let mut dropped = 0;
        while self.consume() {
            dropped += 1;
        }
        dropped
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_rates() {
        for tps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = FrameClock::new(tps).unwrap_err();
            assert!(err.is_config(), "tps {tps} should be a config error");
        }
    }

    #[test]
    fn test_elapsed_ticks() {
        let mut clock = FrameClock::new(60.0).unwrap();
        clock.reset(1_000);
        let ticks = clock.elapsed_ticks(1_000 + 1_000_000_000);
        assert!((ticks - 60.0).abs() < 1e-9);
        // the sample was stored
        assert_eq!(clock.elapsed_ticks(1_000 + 1_000_000_000), 0.0);
    }

    #[test]
    fn test_backwards_sample_yields_zero() {
        let mut clock = FrameClock::new(30.0).unwrap();
        clock.reset(5_000_000_000);
        assert_eq!(clock.elapsed_ticks(4_000_000_000), 0.0);
    }

    #[test]
    fn test_accumulator_consumes_whole_ticks() {
        let mut acc = TickAccumulator::new();
        acc.add(2.5);
        assert!(acc.consume());
        assert!(acc.consume());
        assert!(!acc.consume());
        assert!((acc.pending() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        let mut clock = FrameClock::new(60.0).unwrap();
        let mut acc = TickAccumulator::new();
        // 1/60 s truncated to whole nanoseconds is slightly short of a tick
        acc.add(clock.elapsed_ticks(16_666_666));
        assert!(acc.consume());
        assert_eq!(acc.pending(), 0.0);
    }

    #[test]
    fn test_discard_keeps_fraction() {
        let mut acc = TickAccumulator::new();
        acc.add(5.25);
        assert_eq!(acc.discard_whole(), 5);
        assert!((acc.pending() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(other.now_ms(), 1500);
        other.sleep(Duration::from_millis(500));
        assert_eq!(clock.now_ns(), 2_000_000_000);
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now_ns();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now_ns() > a);
    }
}
