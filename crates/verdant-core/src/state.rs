//! The in-memory half of the world.
//!
//! Plants live in the store; everything else that evolves over time lives
//! here. One [`WorldState`] exists per process and the server guards it
//! with a single async mutex, so a tick has exclusive access from its
//! first elapsed-time reading to its final snapshot.

use std::collections::BTreeMap;

use verdant_types::{EnvironmentLevels, Plant, PlantId, UnixSeconds, Weather, WeatherOverride};
use verdant_world::WeatherOracle;

use crate::clock::TickTimer;
use crate::config::GardenConfig;

/// Weather, environment, overrides and tick bookkeeping.
#[derive(Debug, Clone)]
pub struct WorldState {
    /// Natural weather rotation.
    pub oracle: WeatherOracle,
    /// Ground snow and puddle levels.
    pub env: EnvironmentLevels,
    /// Operator overrides.
    pub overrides: WeatherOverride,
    /// Time of the last committed tick.
    pub timer: TickTimer,
    /// Health of living plants whose drift is still under the write
    /// threshold, keyed by plant. The store holds the last saved value.
    pub unsaved: BTreeMap<PlantId, f64>,
}

impl WorldState {
    /// Fresh world: calm weather, dry bare ground, no overrides, and the
    /// tick timer starting at `started`.
    pub fn new(config: &GardenConfig, started: UnixSeconds) -> Self {
        Self {
            oracle: WeatherOracle::new(&config.weather),
            env: EnvironmentLevels::default(),
            overrides: WeatherOverride::default(),
            timer: TickTimer::new(started),
            unsaved: BTreeMap::new(),
        }
    }

    /// Replace stored health with the unsaved value where one exists.
    /// `last_saved_health` keeps the stored value so drift accumulates.
    pub fn restore_unsaved(&self, plants: &mut [Plant]) {
        for plant in plants.iter_mut().filter(|p| !p.dead) {
            if let Some(&health) = self.unsaved.get(&plant.id) {
                plant.health = health;
            }
        }
    }

    /// Unsaved health after a tick over `living`: every plant still alive
    /// whose health differs from what the store holds. Written, dead and
    /// evicted plants drop out.
    pub fn collect_unsaved(living: &[Plant]) -> BTreeMap<PlantId, f64> {
        living
            .iter()
            .filter(|p| !p.dead && (p.health - p.last_saved_health).abs() > 0.0)
            .map(|p| (p.id, p.health))
            .collect()
    }

    /// Weather category currently in effect.
    pub const fn weather(&self) -> Weather {
        self.oracle.current()
    }
}
