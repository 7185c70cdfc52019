//! In-memory [`WorldStore`] used by the unit tests.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::significant_drop_tightening
)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use verdant_types::{NewPlant, Plant, PlantId, UnixMillis, UnixSeconds};
use verdant_world::PlantChange;

use crate::store::{ProtectOutcome, StoreError, WorldStore};

#[derive(Debug, Default)]
struct Inner {
    plants: BTreeMap<PlantId, Plant>,
    next_id: i64,
    deaths: Option<u64>,
    fail_writes: bool,
    writes: usize,
}

/// Plants in a map behind a mutex, with switchable write failures.
#[derive(Debug)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                deaths: Some(0),
                ..Inner::default()
            }),
        }
    }

    /// Insert a living, full-health plant directly.
    pub(crate) fn seed(&self, max_health: f64, vitality: f64) -> PlantId {
        let mut inner = self.inner.lock().unwrap();
        let id = PlantId(inner.next_id);
        inner.next_id += 1;
        inner.plants.insert(
            id,
            Plant {
                id,
                x: 0.0,
                y: 0.0,
                stem_tex: String::from("stem"),
                leaf_tex: String::from("leaf"),
                flower_tex: String::from("flower"),
                author: String::from("Anonymous"),
                created_at_ms: UnixMillis(1_700_000_000_000.0),
                health: max_health,
                max_health,
                vitality,
                dead: false,
                died_at: UnixSeconds::EPOCH,
                death_cause: None,
                protected_until: UnixSeconds::EPOCH,
                last_saved_health: max_health,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: PlantId) -> Option<Plant> {
        self.inner.lock().unwrap().plants.get(&id).cloned()
    }

    pub(crate) fn set_health(&self, id: PlantId, health: f64) {
        if let Some(plant) = self.inner.lock().unwrap().plants.get_mut(&id) {
            plant.health = health;
            plant.last_saved_health = health;
        }
    }

    pub(crate) fn set_protected_until(&self, id: PlantId, until: UnixSeconds) {
        if let Some(plant) = self.inner.lock().unwrap().plants.get_mut(&id) {
            plant.protected_until = until;
        }
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    pub(crate) fn drop_counter(&self) {
        self.inner.lock().unwrap().deaths = None;
    }

    /// Number of plant rows written by ticks.
    pub(crate) fn writes(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(String::from("injected write failure"))
}

impl WorldStore for MemoryStore {
    async fn evict_dead(&self, cutoff: UnixSeconds) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(unavailable());
        }
        let before = inner.plants.len();
        inner
            .plants
            .retain(|_, p| !(p.dead && p.died_at < cutoff));
        let evicted = u64::try_from(before - inner.plants.len()).unwrap();
        if evicted > 0 {
            if let Some(deaths) = inner.deaths.as_mut() {
                *deaths += evicted;
            }
        }
        Ok(evicted)
    }

    async fn living_plants(&self) -> Result<Vec<Plant>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.plants.values().filter(|p| !p.dead).cloned().collect())
    }

    async fn save_plant_changes(&self, changes: &[PlantChange]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(unavailable());
        }
        for change in changes {
            if let Some(plant) = inner.plants.get_mut(&change.id) {
                plant.health = change.health;
                plant.last_saved_health = change.health;
                plant.dead = change.dead;
                plant.died_at = change.died_at;
                plant.death_cause = change.death_cause;
            }
        }
        inner.writes += changes.len();
        Ok(())
    }

    async fn all_plants(&self) -> Result<Vec<Plant>, StoreError> {
        Ok(self.inner.lock().unwrap().plants.values().cloned().collect())
    }

    async fn death_count(&self) -> Result<Option<u64>, StoreError> {
        Ok(self.inner.lock().unwrap().deaths)
    }

    async fn insert_plant(&self, plant: NewPlant) -> Result<Plant, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(unavailable());
        }
        let id = PlantId(inner.next_id);
        inner.next_id += 1;
        let stored = Plant {
            id,
            x: plant.x,
            y: plant.y,
            stem_tex: plant.stem_tex,
            leaf_tex: plant.leaf_tex,
            flower_tex: plant.flower_tex,
            author: plant.author,
            created_at_ms: plant.created_at_ms,
            health: plant.max_health,
            max_health: plant.max_health,
            vitality: plant.vitality,
            dead: false,
            died_at: UnixSeconds::EPOCH,
            death_cause: None,
            protected_until: UnixSeconds::EPOCH,
            last_saved_health: plant.max_health,
        };
        inner.plants.insert(id, stored.clone());
        Ok(stored)
    }

    async fn protect_plant(
        &self,
        id: PlantId,
        until: UnixSeconds,
    ) -> Result<ProtectOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(unavailable());
        }
        Ok(match inner.plants.get_mut(&id) {
            None => ProtectOutcome::NotFound,
            Some(plant) if plant.dead => ProtectOutcome::Dead,
            Some(plant) => {
                plant.protected_until = until;
                ProtectOutcome::Protected
            }
        })
    }
}
