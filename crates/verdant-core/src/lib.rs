//! World state, observation tick, and garden commands for the Verdant
//! simulation.
//!
//! This crate wires the pure simulation in `verdant-world` to time and
//! storage. It owns no I/O itself: time comes through [`clock::Clock`] and
//! plants through [`store::WorldStore`].
//!
//! # Modules
//!
//! - [`clock`] -- Wall and manual clocks, and the tick timer.
//! - [`config`] -- YAML configuration with defaults and env overrides.
//! - [`state`] -- The lock-guarded in-memory world.
//! - [`store`] -- The persistence trait.
//! - [`tick`] -- One observation tick.
//! - [`garden`] -- Planting and protection.
//! - [`operator`] -- Weather and clock overrides.

pub mod clock;
pub mod config;
pub mod garden;
pub mod operator;
pub mod state;
pub mod store;
pub mod tick;

#[cfg(test)]
mod memory;

pub use clock::{Clock, ManualClock, SystemClock, TickTimer};
pub use config::{ConfigError, GardenConfig, LogFormat};
pub use garden::{CommandError, PlantRequest};
pub use operator::{OverrideRequest, OverrideUpdate};
pub use state::WorldState;
pub use store::{ProtectOutcome, StoreError, WorldStore};
pub use tick::{SimulationRules, TickError, observe};
