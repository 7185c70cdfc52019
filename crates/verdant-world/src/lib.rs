//! Weather, environment, and plant lifecycle for the Verdant garden.
//!
//! Everything in this crate is pure simulation math: no I/O, no clocks,
//! no locks. Callers pass in the current time and elapsed seconds.
//!
//! # Modules
//!
//! - [`weather`] -- Weather Oracle: time-boxed weighted rotation with
//!   operator overrides.
//! - [`environment`] -- Snow and puddle accumulation.
//! - [`lifecycle`] -- Plant damage, regrowth, death, eviction, and vitals
//!   for new plants.
//! - [`snapshot`] -- The read-only payload served to clients.

pub mod environment;
pub mod lifecycle;
pub mod snapshot;
pub mod weather;

// Re-export primary types at crate root.
pub use environment::EnvironmentRates;
pub use lifecycle::{LifecycleRules, PlantChange, PlantDeath, TickOutcome, VitalRanges, Vitals};
pub use weather::{RotationRules, WeatherOracle, WeatherTable, is_hazardous};
