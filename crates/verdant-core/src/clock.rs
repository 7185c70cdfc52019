//! Time sources for the garden.
//!
//! The world has no background loop: it advances only when someone
//! observes it. Every tick reads the time once from a [`Clock`] and the
//! [`TickTimer`] turns that reading into the elapsed seconds since the
//! previous committed tick.
//!
//! - [`SystemClock`] reads the wall clock.
//! - [`ManualClock`] is set by hand and is what tests use.

use std::sync::atomic::{AtomicU64, Ordering};

use verdant_types::UnixSeconds;

/// Microseconds per second.
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// A source of physics time.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> UnixSeconds;
}

/// Wall clock with microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::cast_precision_loss)]
    fn now(&self) -> UnixSeconds {
        // Microsecond epoch values stay well inside f64's exact integer range.
        let micros = chrono::Utc::now().timestamp_micros();
        UnixSeconds(micros as f64 / MICROS_PER_SECOND)
    }
}

/// A clock that only moves when told to.
///
/// Stores the `f64` bit pattern in an atomic so it can be shared between
/// a test and the server it drives without a lock.
#[derive(Debug)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub const fn new(start: UnixSeconds) -> Self {
        Self {
            bits: AtomicU64::new(start.0.to_bits()),
        }
    }

    /// Jump to `time`.
    pub fn set(&self, time: UnixSeconds) {
        self.bits.store(time.0.to_bits(), Ordering::Release);
    }

    /// Move forward by `secs` seconds and return the new reading.
    pub fn advance(&self, secs: f64) -> UnixSeconds {
        let next = self.now().plus_secs(secs);
        self.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UnixSeconds {
        UnixSeconds(f64::from_bits(self.bits.load(Ordering::Acquire)))
    }
}

/// Remembers when the world was last advanced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTimer {
    last_tick: UnixSeconds,
}

impl TickTimer {
    /// Start counting from `started` (normally process start).
    pub const fn new(started: UnixSeconds) -> Self {
        Self { last_tick: started }
    }

    /// Seconds since the last committed tick. Never negative: a wall clock
    /// that stepped backwards yields zero.
    pub fn elapsed(&self, now: UnixSeconds) -> f64 {
        let dt = now.seconds_since(self.last_tick);
        if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
    }

    /// Record that the world has been advanced up to `now`.
    pub const fn commit(&mut self, now: UnixSeconds) {
        self.last_tick = now;
    }

    /// Time of the last committed tick.
    pub const fn last_tick(&self) -> UnixSeconds {
        self.last_tick
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2023() {
        assert!(SystemClock.now().as_f64() > 1_700_000_000.0);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(UnixSeconds(100.0));
        assert_eq!(clock.now(), UnixSeconds(100.0));
        assert_eq!(clock.advance(2.5), UnixSeconds(102.5));
        clock.set(UnixSeconds(50.0));
        assert_eq!(clock.now(), UnixSeconds(50.0));
    }

    #[test]
    fn timer_accumulates_until_commit() {
        let mut timer = TickTimer::new(UnixSeconds(1000.0));
        assert_eq!(timer.elapsed(UnixSeconds(1003.0)), 3.0);
        assert_eq!(timer.elapsed(UnixSeconds(1010.0)), 10.0);
        timer.commit(UnixSeconds(1010.0));
        assert_eq!(timer.elapsed(UnixSeconds(1011.0)), 1.0);
        assert_eq!(timer.last_tick(), UnixSeconds(1010.0));
    }

    #[test]
    fn backwards_clock_yields_zero() {
        let timer = TickTimer::new(UnixSeconds(1000.0));
        assert_eq!(timer.elapsed(UnixSeconds(990.0)), 0.0);
        assert_eq!(timer.elapsed(UnixSeconds(f64::NAN)), 0.0);
    }
}
