//! Plant health integration, death, and eviction.
//!
//! Each tick, for every living plant:
//!
//! 1. Hazardous weather and no protection: health drops at
//!    `damage_per_sec`. Reaching zero kills the plant, pins health at zero
//!    and records the killing category.
//! 2. Non-hazardous weather and health below maximum: health grows at
//!    `regrowth_per_vitality * vitality`, capped at maximum.
//! 3. Otherwise nothing changes.
//!
//! Writes are throttled: a plant is only reported as changed when it died
//! or its health drifted more than `persist_threshold` from the last saved
//! value. Dead plants are removed once `eviction_grace_secs` have passed
//! since death.

use rand::Rng;
use serde::Deserialize;
use tracing::info;
use verdant_types::{Plant, PlantId, UnixSeconds, Weather};

use crate::weather::is_hazardous;

/// Tunable constants of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LifecycleRules {
    /// Health lost per second under hazardous weather.
    pub damage_per_sec: f64,
    /// Health regained per second per point of vitality.
    pub regrowth_per_vitality: f64,
    /// Minimum health drift before a living plant is rewritten.
    pub persist_threshold: f64,
    /// Seconds a dead plant stays visible before eviction.
    pub eviction_grace_secs: f64,
}

impl Default for LifecycleRules {
    fn default() -> Self {
        Self {
            damage_per_sec: 5.0,
            regrowth_per_vitality: 1.5,
            persist_threshold: 0.5,
            eviction_grace_secs: 10.0,
        }
    }
}

/// What happened to a single plant during one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Health did not change (already dead, protected, or at maximum).
    Unchanged,
    /// Lost health but survived.
    Damaged,
    /// Regained health.
    Regrew,
    /// Died this step.
    Died,
}

/// The persisted fields of a plant that changed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantChange {
    /// The plant.
    pub id: PlantId,
    /// New health (also the new last-saved health).
    pub health: f64,
    /// Whether the plant is now dead.
    pub dead: bool,
    /// Death time, or [`UnixSeconds::EPOCH`] if alive.
    pub died_at: UnixSeconds,
    /// Killing category if dead.
    pub death_cause: Option<Weather>,
}

impl PlantChange {
    /// Capture the persisted fields of `plant`.
    pub const fn of(plant: &Plant) -> Self {
        Self {
            id: plant.id,
            health: plant.health,
            dead: plant.dead,
            died_at: plant.died_at,
            death_cause: plant.death_cause,
        }
    }
}

/// A death that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantDeath {
    /// The plant that died.
    pub id: PlantId,
    /// The weather that killed it.
    pub cause: Weather,
}

/// Result of integrating all living plants for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Rows to write back to the store.
    pub changes: Vec<PlantChange>,
    /// Plants that died this tick.
    pub deaths: Vec<PlantDeath>,
}

/// Advance one plant by `dt` seconds.
///
/// Dead plants are never touched. Negative or non-finite `dt` counts as
/// zero.
pub fn integrate_plant(
    plant: &mut Plant,
    weather: Weather,
    dt: f64,
    now: UnixSeconds,
    rules: &LifecycleRules,
) -> Transition {
    if plant.dead {
        return Transition::Unchanged;
    }
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    let hazardous = is_hazardous(weather);

    if hazardous && !plant.is_protected(now) {
        let health = (plant.health - rules.damage_per_sec * dt).max(0.0);
        if health <= 0.0 {
            plant.health = 0.0;
            plant.dead = true;
            plant.died_at = now;
            plant.death_cause = Some(weather);
            return Transition::Died;
        }
        if health < plant.health {
            plant.health = health;
            return Transition::Damaged;
        }
        Transition::Unchanged
    } else if !hazardous && plant.health < plant.max_health {
        let regrowth = rules.regrowth_per_vitality * plant.vitality * dt;
        let health = (plant.health + regrowth).min(plant.max_health);
        if health > plant.health {
            plant.health = health;
            return Transition::Regrew;
        }
        Transition::Unchanged
    } else {
        Transition::Unchanged
    }
}

/// Advance every living plant and collect the rows worth persisting.
///
/// A plant is reported when it died this tick or when its health drifted
/// more than `persist_threshold` from `last_saved_health`; reporting it
/// updates `last_saved_health`.
pub fn integrate(
    plants: &mut [Plant],
    weather: Weather,
    dt: f64,
    now: UnixSeconds,
    rules: &LifecycleRules,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    for plant in plants.iter_mut().filter(|p| !p.dead) {
        let transition = integrate_plant(plant, weather, dt, now, rules);
        let died = transition == Transition::Died;

        if died {
            info!(plant = %plant.id, cause = %weather, author = plant.author.as_str(), "Plant died");
            outcome.deaths.push(PlantDeath {
                id: plant.id,
                cause: weather,
            });
        }

        if died || (plant.health - plant.last_saved_health).abs() > rules.persist_threshold {
            plant.last_saved_health = plant.health;
            outcome.changes.push(PlantChange::of(plant));
        }
    }

    outcome
}

/// Dead plants that died before this instant are due for eviction.
pub fn eviction_cutoff(now: UnixSeconds, rules: &LifecycleRules) -> UnixSeconds {
    now.plus_secs(-rules.eviction_grace_secs)
}

/// Whether `plant` has been dead longer than the grace period.
pub fn is_evictable(plant: &Plant, now: UnixSeconds, rules: &LifecycleRules) -> bool {
    plant.dead && now.seconds_since(plant.died_at) > rules.eviction_grace_secs
}

// ---------------------------------------------------------------------------
// Vitals for new plants
// ---------------------------------------------------------------------------

/// Ranges new plants draw their fixed attributes from.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VitalRanges {
    /// Lower bound of maximum health.
    pub max_health_min: f64,
    /// Upper bound of maximum health.
    pub max_health_max: f64,
    /// Lower bound of vitality.
    pub vitality_min: f64,
    /// Upper bound of vitality.
    pub vitality_max: f64,
}

impl Default for VitalRanges {
    fn default() -> Self {
        Self {
            max_health_min: 80.0,
            max_health_max: 300.0,
            vitality_min: 0.5,
            vitality_max: 5.0,
        }
    }
}

/// Fixed attributes drawn for a new plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    /// Whole-number maximum (and starting) health.
    pub max_health: f64,
    /// Vitality rounded to two decimals.
    pub vitality: f64,
}

/// Draw vitals for a new plant.
///
/// Bounds are inclusive; inverted ranges are swapped rather than panicking.
/// A range with a non-finite bound falls back to the default range.
pub fn roll_vitals<R: Rng + ?Sized>(rng: &mut R, ranges: &VitalRanges) -> Vitals {
    let defaults = VitalRanges::default();
    let (hp_lo, hp_hi) = ordered(
        (ranges.max_health_min, ranges.max_health_max),
        (defaults.max_health_min, defaults.max_health_max),
    );
    let (vit_lo, vit_hi) = ordered(
        (ranges.vitality_min, ranges.vitality_max),
        (defaults.vitality_min, defaults.vitality_max),
    );

    let max_health = rng.random_range(hp_lo..=hp_hi).trunc();
    let vitality = (rng.random_range(vit_lo..=vit_hi) * 100.0).round() / 100.0;
    Vitals {
        max_health,
        vitality,
    }
}

fn ordered((a, b): (f64, f64), fallback: (f64, f64)) -> (f64, f64) {
    if !(a.is_finite() && b.is_finite()) {
        return fallback;
    }
    if a <= b { (a, b) } else { (b, a) }
}
