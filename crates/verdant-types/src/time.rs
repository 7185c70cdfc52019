//! Explicit time units.
//!
//! The world runs on two clocks that must never be confused:
//!
//! - [`UnixSeconds`] is the physics clock. Death times, protection expiry,
//!   weather changes and tick times are all seconds since the Unix epoch.
//! - [`UnixMillis`] is the display clock. Plant creation stamps and the
//!   snapshot time shown to clients are milliseconds since the epoch.
//!
//! Conversions between the two are explicit method calls.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Milliseconds per second.
const MILLIS_PER_SECOND: f64 = 1000.0;

/// Seconds since the Unix epoch (physics clock).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct UnixSeconds(pub f64);

impl UnixSeconds {
    /// The epoch itself. Used as the "unset" value for death and protection
    /// times.
    pub const EPOCH: Self = Self(0.0);

    /// Return the raw number of seconds.
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Return this instant shifted by `secs` seconds.
    #[must_use]
    pub fn plus_secs(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is
    /// in the future).
    pub fn seconds_since(self, earlier: Self) -> f64 {
        self.0 - earlier.0
    }

    /// Convert to the display clock.
    pub fn to_millis(self) -> UnixMillis {
        UnixMillis(self.0 * MILLIS_PER_SECOND)
    }
}

impl core::fmt::Display for UnixSeconds {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Milliseconds since the Unix epoch (display clock).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct UnixMillis(pub f64);

impl UnixMillis {
    /// Stored creation stamps below this value are second-valued legacy
    /// records (the threshold is a second-epoch date in 2033).
    pub const LEGACY_SECONDS_THRESHOLD: f64 = 2_000_000_000.0;

    /// Return the raw number of milliseconds.
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Interpret a stored creation stamp, upgrading second-valued legacy
    /// stamps to milliseconds.
    pub fn from_stored(raw: f64) -> Self {
        if raw > 0.0 && raw < Self::LEGACY_SECONDS_THRESHOLD {
            Self(raw * MILLIS_PER_SECOND)
        } else {
            Self(raw)
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn legacy_second_stamp_is_scaled() {
        assert_eq!(UnixMillis::from_stored(1_700_000_000.0).as_f64(), 1_700_000_000_000.0);
    }

    #[test]
    fn millisecond_stamp_is_untouched() {
        let raw = 1_700_000_000_123.0;
        assert_eq!(UnixMillis::from_stored(raw).as_f64(), raw);
    }

    #[test]
    fn zero_stamp_stays_zero() {
        assert_eq!(UnixMillis::from_stored(0.0).as_f64(), 0.0);
    }

    #[test]
    fn seconds_arithmetic() {
        let t = UnixSeconds(100.0);
        assert_eq!(t.plus_secs(60.0), UnixSeconds(160.0));
        assert_eq!(UnixSeconds(112.5).seconds_since(t), 12.5);
        assert_eq!(t.to_millis(), UnixMillis(100_000.0));
    }
}
