//! Operator overrides.
//!
//! An operator can force a weather category and shift the displayed clock.
//! Updates are partial: a field left out of the request keeps its current
//! value.
//!
//! | `weather` in request | Effect |
//! |----------------------|--------|
//! | absent | keep |
//! | `null` or `""` | clear, natural rotation resumes |
//! | known category | force it |
//! | anything else | rejected |

use serde::{Deserialize, Deserializer};
use tracing::{info, warn};
use verdant_types::{Weather, WeatherOverride};

use crate::garden::CommandError;

/// Raw override request as posted by the admin page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverrideRequest {
    /// `None` when absent; `Some(None)` when explicitly `null`.
    #[serde(default, deserialize_with = "present")]
    pub weather: Option<Option<String>>,

    /// Display offset in hours.
    #[serde(default)]
    pub time_offset: Option<f64>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl OverrideRequest {
    /// Resolve weather names and check the offset.
    pub fn parse(self) -> Result<OverrideUpdate, CommandError> {
        let weather = match self.weather {
            None => None,
            Some(None) => Some(None),
            Some(Some(name)) if name.is_empty() => Some(None),
            Some(Some(name)) => match name.parse::<Weather>() {
                Ok(weather) => Some(Some(weather)),
                Err(e) => {
                    warn!(weather = name.as_str(), "Rejected override");
                    return Err(CommandError::Validation(e.to_string()));
                }
            },
        };

        if let Some(offset) = self.time_offset {
            if !offset.is_finite() {
                warn!(offset, "Rejected override");
                return Err(CommandError::Validation(
                    "time_offset must be a finite number of hours".to_owned(),
                ));
            }
        }

        Ok(OverrideUpdate {
            weather,
            time_offset_hours: self.time_offset,
        })
    }
}

/// A validated partial override.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverrideUpdate {
    /// `None` keeps, `Some(None)` clears, `Some(Some(w))` forces `w`.
    pub weather: Option<Option<Weather>>,
    /// `None` keeps the current offset.
    pub time_offset_hours: Option<f64>,
}

impl OverrideUpdate {
    /// Merge into `current` and return the resulting state.
    pub fn apply(self, current: &mut WeatherOverride) -> WeatherOverride {
        if let Some(weather) = self.weather {
            current.weather = weather;
        }
        if let Some(offset) = self.time_offset_hours {
            current.time_offset_hours = offset;
        }
        info!(
            weather = current.weather.map_or("natural", Weather::as_str),
            time_offset_hours = current.time_offset_hours,
            "Overrides updated"
        );
        *current
    }
}
