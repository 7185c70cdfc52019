//! Persistence seam between the simulation and its database.
//!
//! The tick and the garden commands only see [`WorldStore`]; the `SQLite`
//! implementation lives in `verdant-db` and an in-memory one backs the
//! tests here.
//!
//! Methods return `impl Future + Send` so that callers inside axum handlers
//! stay `Send`.

use std::future::Future;

use verdant_types::{NewPlant, Plant, PlantId, UnixSeconds};
use verdant_world::PlantChange;

/// Errors a store can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing database could not be reached or the query failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be interpreted.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Result of a conditional protection update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectOutcome {
    /// The plant was alive and is now protected.
    Protected,
    /// No plant has that identifier.
    NotFound,
    /// The plant exists but is dead.
    Dead,
}

/// Durable plant records and the eviction counter.
pub trait WorldStore: Send + Sync {
    /// Delete every dead plant that died strictly before `cutoff` and add
    /// the number deleted to the death counter, atomically. Returns the
    /// number deleted.
    fn evict_dead(
        &self,
        cutoff: UnixSeconds,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Every plant that is not dead.
    fn living_plants(&self) -> impl Future<Output = Result<Vec<Plant>, StoreError>> + Send;

    /// Write health and lifecycle fields for each change in one
    /// transaction. Never touches protection.
    fn save_plant_changes(
        &self,
        changes: &[PlantChange],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every stored plant, dead ones included.
    fn all_plants(&self) -> impl Future<Output = Result<Vec<Plant>, StoreError>> + Send;

    /// The cumulative eviction count, or `None` if the counter row is
    /// missing.
    fn death_count(&self) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send;

    /// Store a new plant and return it with its assigned identifier.
    fn insert_plant(
        &self,
        plant: NewPlant,
    ) -> impl Future<Output = Result<Plant, StoreError>> + Send;

    /// Set `protected_until` on a living plant in a single conditional
    /// update.
    fn protect_plant(
        &self,
        id: PlantId,
        until: UnixSeconds,
    ) -> impl Future<Output = Result<ProtectOutcome, StoreError>> + Send;
}
