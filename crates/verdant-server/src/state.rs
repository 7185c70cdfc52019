//! Shared application state for the API server.
//!
//! [`AppState`] owns the one [`WorldState`] of the process behind an async
//! mutex. Observation handlers hold that lock for the whole tick, including
//! store I/O, so two polls can never absorb the same elapsed time. Plant
//! creation and protection never take it.

use std::sync::Arc;

use tokio::sync::Mutex;
use verdant_core::config::PlantConfig;
use verdant_core::{Clock, GardenConfig, SimulationRules, WorldState};
use verdant_db::GardenStore;

/// State shared by every request handler.
pub struct AppState {
    /// Durable plant store.
    pub store: GardenStore,
    /// Weather, environment, overrides and the tick timer.
    pub world: Mutex<WorldState>,
    /// Source of physics time.
    pub clock: Arc<dyn Clock>,
    /// Constants for the observation tick.
    pub rules: SimulationRules,
    /// Plant creation and protection rules.
    pub plants: PlantConfig,
}

impl AppState {
    /// Build state for a fresh process. The tick timer starts at the
    /// clock's current reading.
    pub fn new(store: GardenStore, config: &GardenConfig, clock: Arc<dyn Clock>) -> Self {
        let world = WorldState::new(config, clock.now());
        Self {
            store,
            world: Mutex::new(world),
            clock,
            rules: SimulationRules::from_config(config),
            plants: config.plants.clone(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("rules", &self.rules)
            .field("plants", &self.plants)
            .finish_non_exhaustive()
    }
}
