//! The observation tick.
//!
//! The garden has no background loop. Each observation request runs one
//! tick under the world lock and returns the resulting snapshot:
//!
//! 1. **Elapsed** -- `dt` since the last committed tick.
//! 2. **Evict** -- delete plants dead longer than the grace period and
//!    bump the death counter (one store transaction).
//! 3. **Integrate** -- advance every living plant under the weather that
//!    was in effect during `dt`, then persist the throttled changes (one
//!    store transaction). Health that drifted less than the threshold is
//!    carried in [`WorldState::unsaved`] and picked up again next tick, so
//!    small steps add up instead of being dropped.
//! 4. **Advance** -- commit the timer, let the oracle decide the new
//!    weather, move snow and puddles by `dt` under it.
//! 5. **Snapshot** -- read every plant and the counter and build the
//!    payload.
//!
//! A store failure during steps 2-3 aborts before step 4, so weather,
//! environment and timer stay where they were and the next tick absorbs the
//! whole interval again. Eviction commits on its own; plants it removed stay
//! removed even if the integration write later fails.

use tracing::{debug, error, info, warn};
use verdant_types::{UnixSeconds, WorldUpdate};
use verdant_world::{EnvironmentRates, LifecycleRules, environment, lifecycle, snapshot};

use crate::config::GardenConfig;
use crate::state::WorldState;
use crate::store::{StoreError, WorldStore};

/// Errors that abort an observation tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The store failed. Weather, environment and timer are untouched
    /// if this happened before the plant writes committed.
    #[error("tick aborted: {0}")]
    Store(#[from] StoreError),
}

/// Constants the tick needs from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationRules {
    /// Damage, regrowth, throttling and eviction.
    pub lifecycle: LifecycleRules,
    /// Snow and puddle rates.
    pub environment: EnvironmentRates,
}

impl SimulationRules {
    /// Extract the simulation constants from a loaded configuration.
    pub const fn from_config(config: &GardenConfig) -> Self {
        Self {
            lifecycle: config.plants.lifecycle(),
            environment: config.environment,
        }
    }
}

/// Run one tick at `now` and return the snapshot.
///
/// The caller must hold exclusive access to `world` for the whole call.
pub async fn observe<S: WorldStore>(
    world: &mut WorldState,
    store: &S,
    now: UnixSeconds,
    rules: &SimulationRules,
) -> Result<WorldUpdate, TickError> {
    let dt = world.timer.elapsed(now);
    let weather = world.weather();

    let cutoff = lifecycle::eviction_cutoff(now, &rules.lifecycle);
    let evicted = store.evict_dead(cutoff).await.inspect_err(|e| {
        error!(error = %e, "Eviction failed; tick aborted");
    })?;
    if evicted > 0 {
        info!(evicted, "Evicted dead plants");
    }

    let mut living = store.living_plants().await.inspect_err(|e| {
        error!(error = %e, "Loading living plants failed; tick aborted");
    })?;
    world.restore_unsaved(&mut living);
    let outcome = lifecycle::integrate(&mut living, weather, dt, now, &rules.lifecycle);
    if !outcome.changes.is_empty() {
        store
            .save_plant_changes(&outcome.changes)
            .await
            .inspect_err(|e| {
                error!(error = %e, "Persisting plant changes failed; tick aborted");
            })?;
    }
    debug!(
        dt,
        %weather,
        living = living.len(),
        written = outcome.changes.len(),
        died = outcome.deaths.len(),
        "Plants integrated"
    );

    world.unsaved = WorldState::collect_unsaved(&living);
    world.timer.commit(now);
    let weather = world.oracle.decide(now, world.overrides.weather);
    world.env = environment::advance(world.env, weather, dt, &rules.environment);

    let mut plants = store.all_plants().await?;
    world.restore_unsaved(&mut plants);
    let deaths = if let Some(count) = store.death_count().await? {
        count
    } else {
        warn!("Death counter row missing; reporting 0");
        0
    };

    Ok(snapshot::build(
        now,
        &world.overrides,
        weather,
        world.env,
        &plants,
        deaths,
    ))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::significant_drop_tightening
)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use verdant_types::Weather;
    use verdant_world::WeatherOracle;

    use super::*;
    use crate::clock::TickTimer;
    use crate::memory::MemoryStore;

    const T0: f64 = 1_700_000_000.0;

    /// A world pinned to `weather` until `T0 + 300`.
    fn world_with(weather: Weather) -> WorldState {
        let config = GardenConfig::default();
        let mut world = WorldState::new(&config, UnixSeconds(T0));
        world.oracle = WeatherOracle::from_parts(
            &config.weather,
            StdRng::seed_from_u64(5),
            weather,
            UnixSeconds(T0),
        );
        world
    }

    fn rules() -> SimulationRules {
        SimulationRules::default()
    }

    #[tokio::test]
    async fn storm_damages_by_elapsed_time() {
        let store = MemoryStore::new();
        let id = store.seed(200.0, 2.0);
        let mut world = world_with(Weather::Storm);

        let update = observe(&mut world, &store, UnixSeconds(T0 + 2.0), &rules())
            .await
            .unwrap();

        assert_eq!(update.weather, Weather::Storm);
        let plant = store.get(id).unwrap();
        assert!((plant.health - 190.0).abs() < 1e-9);
        assert_eq!(update.plants[0].stats.hp, plant.health);
    }

    #[tokio::test]
    async fn dt_is_absorbed_exactly_once() {
        let store = MemoryStore::new();
        let id = store.seed(200.0, 2.0);
        let mut world = world_with(Weather::Storm);

        observe(&mut world, &store, UnixSeconds(T0 + 2.0), &rules())
            .await
            .unwrap();
        observe(&mut world, &store, UnixSeconds(T0 + 2.0), &rules())
            .await
            .unwrap();

        assert!((store.get(id).unwrap().health - 190.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn plant_dies_then_is_evicted_once() {
        let store = MemoryStore::new();
        let id = store.seed(10.0, 1.0);
        let mut world = world_with(Weather::Hail);

        let update = observe(&mut world, &store, UnixSeconds(T0 + 3.0), &rules())
            .await
            .unwrap();
        let view = &update.plants[0];
        assert!(view.stats.dead);
        assert_eq!(view.stats.hp, 0.0);
        assert_eq!(view.stats.death_cause, Some(Weather::Hail));
        assert_eq!(view.stats.death_time, UnixSeconds(T0 + 3.0));
        assert_eq!(update.deaths, 0);

        // Still visible inside the grace period.
        let update = observe(&mut world, &store, UnixSeconds(T0 + 13.0), &rules())
            .await
            .unwrap();
        assert_eq!(update.plants.len(), 1);
        assert_eq!(update.deaths, 0);

        let update = observe(&mut world, &store, UnixSeconds(T0 + 13.5), &rules())
            .await
            .unwrap();
        assert!(update.plants.is_empty());
        assert_eq!(update.deaths, 1);
        assert!(store.get(id).is_none());

        let update = observe(&mut world, &store, UnixSeconds(T0 + 60.0), &rules())
            .await
            .unwrap();
        assert_eq!(update.deaths, 1);
    }

    #[tokio::test]
    async fn protected_plant_survives_storm() {
        let store = MemoryStore::new();
        let id = store.seed(50.0, 1.0);
        store.set_protected_until(id, UnixSeconds(T0 + 60.0));
        let mut world = world_with(Weather::Tornado);

        observe(&mut world, &store, UnixSeconds(T0 + 30.0), &rules())
            .await
            .unwrap();

        let plant = store.get(id).unwrap();
        assert_eq!(plant.health, 50.0);
        assert!(!plant.dead);
    }

    #[tokio::test]
    async fn environment_uses_newly_decided_weather() {
        let store = MemoryStore::new();
        let mut world = world_with(Weather::Sunny);
        world.overrides.weather = Some(Weather::Blizzard);

        let update = observe(&mut world, &store, UnixSeconds(T0 + 10.0), &rules())
            .await
            .unwrap();

        assert_eq!(update.weather, Weather::Blizzard);
        assert!((update.env.snow_level - 0.02).abs() < 1e-12);
    }

    #[tokio::test]
    async fn plant_damage_uses_previous_weather() {
        let store = MemoryStore::new();
        let id = store.seed(100.0, 1.0);
        let mut world = world_with(Weather::Sunny);
        world.overrides.weather = Some(Weather::Storm);

        // The storm is decided this tick but the interval was sunny.
        observe(&mut world, &store, UnixSeconds(T0 + 1.0), &rules())
            .await
            .unwrap();
        assert_eq!(store.get(id).unwrap().health, 100.0);

        observe(&mut world, &store, UnixSeconds(T0 + 2.0), &rules())
            .await
            .unwrap();
        assert!((store.get(id).unwrap().health - 95.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn store_failure_leaves_world_untouched() {
        let store = MemoryStore::new();
        let id = store.seed(200.0, 2.0);
        let mut world = world_with(Weather::Storm);
        world.overrides.weather = Some(Weather::Rain);
        let env_before = world.env;

        store.fail_writes(true);
        let result = observe(&mut world, &store, UnixSeconds(T0 + 2.0), &rules()).await;
        assert!(matches!(result, Err(TickError::Store(StoreError::Unavailable(_)))));
        assert_eq!(world.timer, TickTimer::new(UnixSeconds(T0)));
        assert_eq!(world.weather(), Weather::Storm);
        assert_eq!(world.env, env_before);
        assert_eq!(store.get(id).unwrap().health, 200.0);

        // Recovery re-absorbs the whole interval.
        store.fail_writes(false);
        observe(&mut world, &store, UnixSeconds(T0 + 4.0), &rules())
            .await
            .unwrap();
        assert!((store.get(id).unwrap().health - 180.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_counter_reports_zero() {
        let store = MemoryStore::new();
        store.drop_counter();
        let mut world = world_with(Weather::Sunny);

        let update = observe(&mut world, &store, UnixSeconds(T0 + 1.0), &rules())
            .await
            .unwrap();
        assert_eq!(update.deaths, 0);
    }

    #[tokio::test]
    async fn small_regrowth_is_carried_until_written() {
        let store = MemoryStore::new();
        let id = store.seed(100.0, 1.0);
        store.set_health(id, 50.0);
        let mut world = world_with(Weather::Cloudy);

        // 1.5 * 1.0 * 0.2 = 0.3, under the write threshold.
        let update = observe(&mut world, &store, UnixSeconds(T0 + 0.2), &rules())
            .await
            .unwrap();
        assert_eq!(store.get(id).unwrap().health, 50.0);
        assert_eq!(store.writes(), 0);
        assert!((update.plants[0].stats.hp - 50.3).abs() < 1e-5);
        assert!((world.unsaved[&id] - 50.3).abs() < 1e-5);

        // Another 0.3 crosses the threshold and is written.
        observe(&mut world, &store, UnixSeconds(T0 + 0.4), &rules())
            .await
            .unwrap();
        assert!((store.get(id).unwrap().health - 50.6).abs() < 1e-5);
        assert_eq!(store.writes(), 1);
        assert!(world.unsaved.is_empty());
    }

    #[tokio::test]
    async fn frequent_polls_under_storm_still_kill() {
        let store = MemoryStore::new();
        let id = store.seed(100.0, 1.0);
        let mut world = world_with(Weather::Storm);

        // 0.1 s per poll is 0.5 hp per tick, at the write threshold.
        let mut hp = 100.0;
        for step in 1..=100 {
            let now = UnixSeconds(T0 + f64::from(step) * 0.1);
            let update = observe(&mut world, &store, now, &rules()).await.unwrap();
            let next = update.plants[0].stats.hp;
            assert!(next < hp, "health must keep falling");
            hp = next;
        }
        assert!((hp - 50.0).abs() < 1e-4, "hp {hp}");
        assert!((store.get(id).unwrap().health - hp).abs() <= 0.5 + 1e-6);

        for step in 101..=210 {
            let now = UnixSeconds(T0 + f64::from(step) * 0.1);
            observe(&mut world, &store, now, &rules()).await.unwrap();
        }
        let plant = store.get(id).unwrap();
        assert!(plant.dead);
        assert_eq!(plant.health, 0.0);
        assert_eq!(plant.death_cause, Some(Weather::Storm));
        assert!(world.unsaved.is_empty());
    }

    #[tokio::test]
    async fn frequent_polls_in_sun_still_regrow() {
        let store = MemoryStore::new();
        let id = store.seed(100.0, 0.5);
        store.set_health(id, 50.0);
        let mut world = world_with(Weather::Sunny);

        // 1.5 * 0.5 * 0.5 = 0.375 hp per tick.
        let mut last = None;
        for step in 1..=120 {
            let now = UnixSeconds(T0 + f64::from(step) * 0.5);
            last = Some(observe(&mut world, &store, now, &rules()).await.unwrap());
        }
        let hp = last.unwrap().plants[0].stats.hp;
        assert!((hp - 95.0).abs() < 1e-4, "hp {hp}");
        assert!((store.get(id).unwrap().health - 95.0).abs() <= 0.5 + 1e-4);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_unsaved_health() {
        let store = MemoryStore::new();
        let id = store.seed(100.0, 1.0);
        store.set_health(id, 50.0);
        let mut world = world_with(Weather::Cloudy);

        observe(&mut world, &store, UnixSeconds(T0 + 0.2), &rules())
            .await
            .unwrap();
        store.fail_writes(true);
        assert!(
            observe(&mut world, &store, UnixSeconds(T0 + 10.0), &rules())
                .await
                .is_err()
        );
        assert!((world.unsaved[&id] - 50.3).abs() < 1e-5);

        store.fail_writes(false);
        observe(&mut world, &store, UnixSeconds(T0 + 10.0), &rules())
            .await
            .unwrap();
        assert!((store.get(id).unwrap().health - 65.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn display_time_carries_offset() {
        let store = MemoryStore::new();
        let mut world = world_with(Weather::Sunny);
        world.overrides.time_offset_hours = 1.0;

        let update = observe(&mut world, &store, UnixSeconds(T0), &rules())
            .await
            .unwrap();
        assert_eq!(update.time.as_f64(), (T0 + 3600.0) * 1000.0);
    }
}
