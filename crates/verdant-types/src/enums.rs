//! Enumeration types for the garden world.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Returned when a string does not name a known [`Weather`] category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weather category: {0:?}")]
pub struct UnknownWeather(pub String);

/// Weather category shared by every client of the world.
///
/// The wire form is the `snake_case` name (`"dust_storm"`, `"sunny"`, ...),
/// which is also what the browser client keys its effects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Weather {
    /// Calm default weather. Fastest drying and snow melt.
    Sunny,
    /// Overcast.
    Cloudy,
    /// Light wind; dries puddles quickly.
    Breeze,
    /// Rain; fills puddles and melts snow.
    Rain,
    /// Storm; hazardous, fills puddles fast.
    Storm,
    /// Strong wind; dries puddles quickly.
    Gale,
    /// Snowfall; slowly builds snow cover.
    Snow,
    /// Blizzard; hazardous, builds snow cover fast.
    Blizzard,
    /// Hail; hazardous.
    Hail,
    /// Fog.
    Fog,
    /// Tornado; hazardous.
    Tornado,
    /// Dust storm; dries puddles quickly.
    DustStorm,
    /// Volcanic ash fall.
    VolcanicAsh,
    /// Meteor shower.
    MeteorShower,
    /// Aurora borealis.
    AuroraBorealis,
}

impl Weather {
    /// Every category, in catalogue order. The calm default comes first.
    pub const ALL: [Self; 15] = [
        Self::Sunny,
        Self::Cloudy,
        Self::Breeze,
        Self::Rain,
        Self::Storm,
        Self::Gale,
        Self::Snow,
        Self::Blizzard,
        Self::Hail,
        Self::Fog,
        Self::Tornado,
        Self::DustStorm,
        Self::VolcanicAsh,
        Self::MeteorShower,
        Self::AuroraBorealis,
    ];

    /// The calm category the world starts in and favours when rotating.
    pub const CALM: Self = Self::Sunny;

    /// Return the wire name of this category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Breeze => "breeze",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Gale => "gale",
            Self::Snow => "snow",
            Self::Blizzard => "blizzard",
            Self::Hail => "hail",
            Self::Fog => "fog",
            Self::Tornado => "tornado",
            Self::DustStorm => "dust_storm",
            Self::VolcanicAsh => "volcanic_ash",
            Self::MeteorShower => "meteor_shower",
            Self::AuroraBorealis => "aurora_borealis",
        }
    }
}

impl core::fmt::Display for Weather {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = UnknownWeather;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| UnknownWeather(s.to_owned()))
    }
}
