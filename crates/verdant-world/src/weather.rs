//! Weather rotation for the shared garden.
//!
//! The oracle holds the current category and the time of the last natural
//! change. On every observation it either honours an operator override or,
//! once the rotation interval has elapsed, draws a new category from a
//! cumulative weight table.
//!
//! # Weights
//!
//! | Category | Weight |
//! |----------|--------|
//! | `sunny` (calm) | `calm_weight` (default 0.3) |
//! | each of the other 14 | `(1 - calm_weight) / 14` |
//!
//! # Determinism
//!
//! The RNG is a [`StdRng`] seeded from the configured seed, so the same seed
//! and the same sequence of observation times reproduce the same weather.
//! Without a seed the generator is seeded from the operating system.
//!
//! # Overrides
//!
//! Overrides and the natural timer are independent. While an override is
//! set it becomes the current category and the timer is left alone; after
//! it is cleared the overridden category stays current until the (possibly
//! long expired) timer triggers the next draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;
use verdant_types::{UnixSeconds, Weather};

/// Default seconds between natural weather changes.
pub const DEFAULT_ROTATION_SECS: f64 = 300.0;

/// Default share of the probability mass given to the calm category.
pub const DEFAULT_CALM_WEIGHT: f64 = 0.3;

/// Whether a category damages unprotected plants.
pub const fn is_hazardous(weather: Weather) -> bool {
    matches!(
        weather,
        Weather::Storm | Weather::Blizzard | Weather::Tornado | Weather::Hail
    )
}

/// Rotation parameters for the [`WeatherOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotationRules {
    /// Seconds a naturally drawn category lasts before the next draw.
    pub rotation_secs: f64,
    /// Probability of drawing the calm category.
    pub calm_weight: f64,
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for RotationRules {
    fn default() -> Self {
        Self {
            rotation_secs: DEFAULT_ROTATION_SECS,
            calm_weight: DEFAULT_CALM_WEIGHT,
            seed: None,
        }
    }
}

/// Cumulative weight table over [`Weather::ALL`].
///
/// Built once; each draw is a single uniform sample located with a binary
/// search over the cumulative bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTable {
    /// `(category, upper bound)` pairs with strictly increasing bounds
    /// ending at 1.0.
    bounds: Vec<(Weather, f64)>,
}

impl WeatherTable {
    /// Build the table giving `calm_weight` to [`Weather::CALM`] and
    /// splitting the rest evenly across the other categories.
    ///
    /// `calm_weight` is clamped to `[0, 1]`.
    pub fn new(calm_weight: f64) -> Self {
        let calm = calm_weight.clamp(0.0, 1.0);
        let others = Weather::ALL.iter().filter(|w| **w != Weather::CALM).count();
        let other_weight = if others == 0 {
            0.0
        } else {
            (1.0 - calm) / f64::from(u32::try_from(others).unwrap_or(u32::MAX))
        };

        let mut cumulative = 0.0;
        let mut bounds = Vec::with_capacity(Weather::ALL.len());
        for weather in Weather::ALL {
            cumulative += if weather == Weather::CALM { calm } else { other_weight };
            bounds.push((weather, cumulative));
        }

        // Normalize so float drift never leaves a gap below 1.0.
        if cumulative > 0.0 {
            for entry in &mut bounds {
                entry.1 /= cumulative;
            }
        }
        Self { bounds }
    }

    /// Select the category for a uniform draw in `[0, 1)`.
    pub fn select(&self, draw: f64) -> Weather {
        let idx = self.bounds.partition_point(|&(_, bound)| bound <= draw);
        self.bounds
            .get(idx)
            .or_else(|| self.bounds.last())
            .map_or(Weather::CALM, |&(weather, _)| weather)
    }

    /// Probability assigned to `weather`.
    pub fn probability(&self, weather: Weather) -> f64 {
        let mut previous = 0.0;
        for &(w, bound) in &self.bounds {
            if w == weather {
                return bound - previous;
            }
            previous = bound;
        }
        0.0
    }
}

/// Time-boxed weather state machine.
#[derive(Debug, Clone)]
pub struct WeatherOracle {
    table: WeatherTable,
    rng: StdRng,
    rotation_secs: f64,
    current: Weather,
    last_change: UnixSeconds,
}

impl WeatherOracle {
    /// Create an oracle in the calm category with the natural timer at the
    /// epoch, so the first observation draws immediately.
    pub fn new(rules: &RotationRules) -> Self {
        let rng = rules
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::from_parts(rules, rng, Weather::CALM, UnixSeconds::EPOCH)
    }

    /// Create an oracle with explicit state (tests and restoration).
    pub fn from_parts(
        rules: &RotationRules,
        rng: StdRng,
        current: Weather,
        last_change: UnixSeconds,
    ) -> Self {
        Self {
            table: WeatherTable::new(rules.calm_weight),
            rng,
            rotation_secs: rules.rotation_secs,
            current,
            last_change,
        }
    }

    /// Decide the weather at `now`.
    ///
    /// A forced category wins unconditionally and becomes current without
    /// touching the natural timer.
    pub fn decide(&mut self, now: UnixSeconds, forced: Option<Weather>) -> Weather {
        if let Some(weather) = forced {
            self.current = weather;
            return weather;
        }

        if now.seconds_since(self.last_change) > self.rotation_secs {
            let previous = self.current;
            let draw: f64 = self.rng.random();
            self.current = self.table.select(draw);
            self.last_change = now;
            info!(from = %previous, to = %self.current, at = %now, "Weather rotated");
        }
        self.current
    }

    /// Category currently in effect.
    pub const fn current(&self) -> Weather {
        self.current
    }

    /// Time of the last natural change.
    pub const fn last_change(&self) -> UnixSeconds {
        self.last_change
    }

    /// The weight table used for draws.
    pub const fn table(&self) -> &WeatherTable {
        &self.table
    }
}
