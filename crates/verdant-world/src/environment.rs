//! Ground snow cover and wetness.
//!
//! Both levels are scalars in `[0, 1]` advanced once per tick from the
//! current weather and the elapsed seconds. All rates are per second.
//!
//! | Weather | Snow | Puddles |
//! |---------|------|---------|
//! | `blizzard` | +`blizzard_snowfall` | dry at `drying` |
//! | `snow` | +`snowfall` | dry at `drying` |
//! | `sunny` | -`calm_snow_melt` | dry at `calm_drying` |
//! | `storm` | -`snow_melt` -`rain_snow_melt` | +`storm_flooding` |
//! | `rain` | -`snow_melt` -`rain_snow_melt` | +`rain_flooding` |
//! | `breeze`, `gale`, `dust_storm` | -`snow_melt` | dry at `wind_drying` |
//! | anything else | -`snow_melt` | dry at `drying` |

use serde::Deserialize;
use verdant_types::{EnvironmentLevels, Weather};

/// Per-second accumulation and decay rates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentRates {
    /// Snow gain under `blizzard`.
    pub blizzard_snowfall: f64,
    /// Snow gain under `snow`.
    pub snowfall: f64,
    /// Snow loss under the calm category.
    pub calm_snow_melt: f64,
    /// Snow loss under any other non-snowing category.
    pub snow_melt: f64,
    /// Extra snow loss while it rains or storms.
    pub rain_snow_melt: f64,
    /// Puddle gain under `storm`.
    pub storm_flooding: f64,
    /// Puddle gain under `rain`.
    pub rain_flooding: f64,
    /// Puddle loss under the calm category.
    pub calm_drying: f64,
    /// Puddle loss under windy or dusty categories.
    pub wind_drying: f64,
    /// Puddle loss under every other dry category.
    pub drying: f64,
}

impl Default for EnvironmentRates {
    fn default() -> Self {
        Self {
            blizzard_snowfall: 0.002,
            snowfall: 0.0005,
            calm_snow_melt: 0.001,
            snow_melt: 0.0002,
            rain_snow_melt: 0.002,
            storm_flooding: 0.005,
            rain_flooding: 0.001,
            calm_drying: 0.003,
            wind_drying: 0.002,
            drying: 0.0005,
        }
    }
}

impl EnvironmentRates {
    /// Every rate, for validation.
    pub const fn all(&self) -> [f64; 10] {
        [
            self.blizzard_snowfall,
            self.snowfall,
            self.calm_snow_melt,
            self.snow_melt,
            self.rain_snow_melt,
            self.storm_flooding,
            self.rain_flooding,
            self.calm_drying,
            self.wind_drying,
            self.drying,
        ]
    }
}

/// Advance the environment by `dt` seconds under `weather`.
///
/// Pure; call exactly once per tick with the tick's `dt`. Negative or
/// non-finite `dt` counts as zero. The result is always within `[0, 1]`.
pub fn advance(
    levels: EnvironmentLevels,
    weather: Weather,
    dt: f64,
    rates: &EnvironmentRates,
) -> EnvironmentLevels {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    let mut snow = unit(levels.snow_level);
    let mut puddle = unit(levels.puddle_level);

    snow = match weather {
        Weather::Blizzard => unit(snow + rates.blizzard_snowfall * dt),
        Weather::Snow => unit(snow + rates.snowfall * dt),
        Weather::Sunny => unit(snow - rates.calm_snow_melt * dt),
        _ => unit(snow - rates.snow_melt * dt),
    };

    match weather {
        Weather::Storm | Weather::Rain => {
            let flooding = if weather == Weather::Storm {
                rates.storm_flooding
            } else {
                rates.rain_flooding
            };
            puddle = unit(puddle + flooding * dt);
            snow = unit(snow - rates.rain_snow_melt * dt);
        }
        _ => {
            let drying = match weather {
                Weather::Sunny => rates.calm_drying,
                Weather::Breeze | Weather::Gale | Weather::DustStorm => rates.wind_drying,
                _ => rates.drying,
            };
            puddle = unit(puddle - drying * dt);
        }
    }

    EnvironmentLevels {
        snow_level: snow,
        puddle_level: puddle,
    }
}

/// Clamp into `[0, 1]`; NaN collapses to 0.
fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
