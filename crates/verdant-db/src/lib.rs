//! `SQLite` persistence for the Verdant garden.
//!
//! ```text
//! observe / plant_seed / protect
//!     |
//!     +-- WorldStore (verdant-core)
//!         |
//!         +-- GardenStore
//!             |-- PlantStore    (plants table)
//!             +-- CounterStore  (counters table)
//! ```
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool and migrations
//! - [`plant_store`] -- Plant rows
//! - [`counter_store`] -- Named counters
//! - [`world_store`] -- The [`WorldStore`](verdant_core::WorldStore) implementation
//! - [`error`] -- Shared error types

pub mod counter_store;
pub mod error;
pub mod plant_store;
pub mod sqlite;
pub mod world_store;

// Re-export primary types for convenience.
pub use counter_store::CounterStore;
pub use error::DbError;
pub use plant_store::{PlantRow, PlantStore};
pub use sqlite::{SqliteConfig, SqliteDb};
pub use world_store::GardenStore;
