//! Shared type definitions for the Verdant garden simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Verdant workspace. Wire types flow downstream to `TypeScript` via
//! `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- The weather catalogue
//! - [`time`] -- Distinct physics (seconds) and display (milliseconds) clocks
//! - [`structs`] -- Plant records, world values, and wire payloads

pub mod enums;
pub mod ids;
pub mod structs;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use enums::{UnknownWeather, Weather};
pub use ids::PlantId;
pub use structs::{
    AdminOverview, EnvironmentLevels, NewPlant, OverrideState, Plant, PlantStats, PlantView,
    ProtectionGrant, WeatherOverride, WorldUpdate,
};
pub use time::{UnixMillis, UnixSeconds};
