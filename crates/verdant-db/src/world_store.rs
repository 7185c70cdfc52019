//! [`WorldStore`] backed by `SQLite`.

use verdant_core::{ProtectOutcome, StoreError, WorldStore};
use verdant_types::{NewPlant, Plant, PlantId, UnixSeconds};
use verdant_world::PlantChange;

use crate::counter_store::{self, CounterStore};
use crate::plant_store::PlantStore;
use crate::sqlite::SqliteDb;

/// The garden's durable state: plants and the death counter.
#[derive(Debug, Clone)]
pub struct GardenStore {
    db: SqliteDb,
}

impl GardenStore {
    /// Wrap a connected, migrated database.
    pub const fn new(db: SqliteDb) -> Self {
        Self { db }
    }

    /// The underlying database handle.
    pub const fn db(&self) -> &SqliteDb {
        &self.db
    }

    fn plants(&self) -> PlantStore<'_> {
        PlantStore::new(self.db.pool())
    }
}

impl WorldStore for GardenStore {
    async fn evict_dead(&self, cutoff: UnixSeconds) -> Result<u64, StoreError> {
        Ok(self.plants().evict_dead(cutoff).await?)
    }

    async fn living_plants(&self) -> Result<Vec<Plant>, StoreError> {
        Ok(self.plants().living().await?)
    }

    async fn save_plant_changes(&self, changes: &[PlantChange]) -> Result<(), StoreError> {
        Ok(self.plants().save_changes(changes).await?)
    }

    async fn all_plants(&self) -> Result<Vec<Plant>, StoreError> {
        Ok(self.plants().all().await?)
    }

    async fn death_count(&self) -> Result<Option<u64>, StoreError> {
        Ok(CounterStore::new(self.db.pool())
            .get(counter_store::DEATHS)
            .await?)
    }

    async fn insert_plant(&self, plant: NewPlant) -> Result<Plant, StoreError> {
        Ok(self.plants().insert(plant).await?)
    }

    async fn protect_plant(
        &self,
        id: PlantId,
        until: UnixSeconds,
    ) -> Result<ProtectOutcome, StoreError> {
        Ok(self.plants().protect(id, until).await?)
    }
}
