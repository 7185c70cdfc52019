//! Core entity structs and wire payloads.
//!
//! [`Plant`] is the authoritative record as the store holds it. The
//! remaining types are projections sent to clients; their JSON field names
//! follow what the browser client already reads (`stemTex`, `maxHp`,
//! `server_time`, ...), so several fields carry explicit serde renames.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Weather;
use crate::ids::PlantId;
use crate::time::{UnixMillis, UnixSeconds};

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// A planted organism as persisted by the store.
///
/// While alive, `0 <= health <= max_health`. Once `dead` is set the record
/// is frozen until eviction deletes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    /// Store-assigned identifier.
    pub id: PlantId,
    /// Horizontal position in world units.
    pub x: f64,
    /// Vertical position in world units.
    pub y: f64,
    /// Stem texture identifier (typically a data URL).
    pub stem_tex: String,
    /// Leaf texture identifier.
    pub leaf_tex: String,
    /// Flower texture identifier.
    pub flower_tex: String,
    /// Free-text author label.
    pub author: String,
    /// Creation stamp as stored. Older rows may hold seconds; see
    /// [`UnixMillis::from_stored`].
    pub created_at_ms: UnixMillis,
    /// Current health.
    pub health: f64,
    /// Maximum health, fixed at creation.
    pub max_health: f64,
    /// Regrowth multiplier, fixed at creation.
    pub vitality: f64,
    /// Whether the plant has died.
    pub dead: bool,
    /// Time of death; [`UnixSeconds::EPOCH`] while alive.
    pub died_at: UnixSeconds,
    /// Weather that killed the plant; `None` while alive.
    pub death_cause: Option<Weather>,
    /// Protection expiry; [`UnixSeconds::EPOCH`] means never protected.
    pub protected_until: UnixSeconds,
    /// Health value last written to the store.
    pub last_saved_health: f64,
}

impl Plant {
    /// Whether the plant is shielded from hazardous weather at `now`.
    pub fn is_protected(&self, now: UnixSeconds) -> bool {
        self.protected_until > now
    }
}

/// Attributes of a plant that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Stem texture identifier.
    pub stem_tex: String,
    /// Leaf texture identifier.
    pub leaf_tex: String,
    /// Flower texture identifier.
    pub flower_tex: String,
    /// Author label (already defaulted).
    pub author: String,
    /// Maximum (and initial) health.
    pub max_health: f64,
    /// Regrowth multiplier.
    pub vitality: f64,
    /// Creation stamp in milliseconds.
    pub created_at_ms: UnixMillis,
}

// ---------------------------------------------------------------------------
// World-level values
// ---------------------------------------------------------------------------

/// Ground snow cover and wetness, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentLevels {
    /// Snow cover.
    pub snow_level: f64,
    /// Puddle coverage.
    pub puddle_level: f64,
}

/// Operator overrides applied on top of the natural simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeatherOverride {
    /// Forced weather category; suspends the natural rotation while set.
    pub weather: Option<Weather>,
    /// Hours added to the displayed clock only.
    #[serde(rename = "time_offset")]
    pub time_offset_hours: f64,
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// Public status sub-record of a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantStats {
    /// Current health.
    pub hp: f64,
    /// Maximum health.
    #[serde(rename = "maxHp")]
    pub max_hp: f64,
    /// Vitality (regrowth multiplier).
    pub vit: f64,
    /// Whether the plant is dead.
    pub dead: bool,
    /// Time of death in seconds; zero while alive.
    pub death_time: UnixSeconds,
    /// Killing weather category.
    pub death_cause: Option<Weather>,
    /// Protection expiry in seconds; zero when never protected.
    pub protect_until: UnixSeconds,
}

/// A plant as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantView {
    /// Plant identifier.
    pub id: PlantId,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Stem texture.
    #[serde(rename = "stemTex")]
    pub stem_tex: String,
    /// Leaf texture.
    #[serde(rename = "leafTex")]
    pub leaf_tex: String,
    /// Flower texture.
    #[serde(rename = "flowerTex")]
    pub flower_tex: String,
    /// Author label.
    pub author: String,
    /// Creation stamp in milliseconds.
    pub server_time: UnixMillis,
    /// Vital and lifecycle status.
    pub stats: PlantStats,
}

/// Payload returned by every observation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldUpdate {
    /// Displayed current time in milliseconds (includes the operator offset).
    pub time: UnixMillis,
    /// Current weather category.
    pub weather: Weather,
    /// Environment levels.
    pub env: EnvironmentLevels,
    /// Every stored plant, dead ones included until evicted.
    pub plants: Vec<PlantView>,
    /// Cumulative number of evicted (dead and removed) plants.
    #[ts(type = "number")]
    pub deaths: u64,
}

impl WorldUpdate {
    /// Keep only plants created strictly after `since`.
    ///
    /// Lets polling clients request just the plants they have not seen.
    pub fn retain_created_after(&mut self, since: UnixMillis) {
        self.plants.retain(|p| p.server_time > since);
    }
}

/// Response to a successful protection request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProtectionGrant {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// New protection expiry in seconds.
    pub protect_until: UnixSeconds,
}

/// Response to an override update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OverrideState {
    /// Always `"ok"`.
    pub status: String,
    /// The override state after the update was merged.
    pub overrides: WeatherOverride,
}

/// Operator view of the world's weather controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdminOverview {
    /// Active overrides.
    pub overrides: WeatherOverride,
    /// Weather category currently in effect.
    pub weather: Weather,
    /// Every selectable weather category.
    pub weather_types: Vec<Weather>,
}
