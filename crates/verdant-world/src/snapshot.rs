//! Read-only projection of the world sent to polling clients.

use verdant_types::{
    EnvironmentLevels, Plant, PlantStats, PlantView, UnixMillis, UnixSeconds, Weather,
    WeatherOverride, WorldUpdate,
};

/// Seconds per hour, for the display offset.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Displayed clock: physics time shifted by the operator offset, in
/// milliseconds. Never feeds back into the simulation.
pub fn display_time(now: UnixSeconds, overrides: &WeatherOverride) -> UnixMillis {
    now.plus_secs(overrides.time_offset_hours * SECONDS_PER_HOUR)
        .to_millis()
}

/// Project a stored plant into its public form.
pub fn plant_view(plant: &Plant) -> PlantView {
    PlantView {
        id: plant.id,
        x: plant.x,
        y: plant.y,
        stem_tex: plant.stem_tex.clone(),
        leaf_tex: plant.leaf_tex.clone(),
        flower_tex: plant.flower_tex.clone(),
        author: plant.author.clone(),
        server_time: UnixMillis::from_stored(plant.created_at_ms.as_f64()),
        stats: PlantStats {
            hp: plant.health,
            max_hp: plant.max_health,
            vit: plant.vitality,
            dead: plant.dead,
            death_time: plant.died_at,
            death_cause: plant.death_cause,
            protect_until: plant.protected_until,
        },
    }
}

/// Assemble the observation payload.
///
/// Pure: identical inputs always give identical output.
pub fn build(
    now: UnixSeconds,
    overrides: &WeatherOverride,
    weather: Weather,
    env: EnvironmentLevels,
    plants: &[Plant],
    deaths: u64,
) -> WorldUpdate {
    WorldUpdate {
        time: display_time(now, overrides),
        weather,
        env,
        plants: plants.iter().map(plant_view).collect(),
        deaths,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use verdant_types::PlantId;

    use super::*;

    fn stored(id: i64, created_at_ms: f64) -> Plant {
        Plant {
            id: PlantId(id),
            x: 10.0,
            y: 20.0,
            stem_tex: String::from("data:stem"),
            leaf_tex: String::from("data:leaf"),
            flower_tex: String::from("data:flower"),
            author: String::from("Rowan"),
            created_at_ms: UnixMillis(created_at_ms),
            health: 0.0,
            max_health: 120.0,
            vitality: 1.25,
            dead: true,
            died_at: UnixSeconds(1_700_000_100.0),
            death_cause: Some(Weather::Hail),
            protected_until: UnixSeconds(1_700_000_050.0),
            last_saved_health: 0.0,
        }
    }

    #[test]
    fn display_time_applies_offset_only_to_display() {
        let overrides = WeatherOverride {
            weather: None,
            time_offset_hours: 2.0,
        };
        let now = UnixSeconds(1_000.0);
        assert_eq!(display_time(now, &overrides), UnixMillis(8_200_000.0));
        assert_eq!(
            display_time(now, &WeatherOverride::default()),
            UnixMillis(1_000_000.0)
        );
    }

    #[test]
    fn legacy_second_stamps_are_upgraded() {
        let update = build(
            UnixSeconds(1_700_000_200.0),
            &WeatherOverride::default(),
            Weather::Sunny,
            EnvironmentLevels::default(),
            &[stored(1, 1_700_000_000.0), stored(2, 1_700_000_000_500.0)],
            3,
        );
        assert_eq!(update.plants[0].server_time, UnixMillis(1_700_000_000_000.0));
        assert_eq!(update.plants[1].server_time, UnixMillis(1_700_000_000_500.0));
    }

    #[test]
    fn status_sub_record_mirrors_plant() {
        let view = plant_view(&stored(5, 1.0));
        assert_eq!(view.stats.hp, 0.0);
        assert_eq!(view.stats.max_hp, 120.0);
        assert_eq!(view.stats.vit, 1.25);
        assert!(view.stats.dead);
        assert_eq!(view.stats.death_time, UnixSeconds(1_700_000_100.0));
        assert_eq!(view.stats.death_cause, Some(Weather::Hail));
        assert_eq!(view.stats.protect_until, UnixSeconds(1_700_000_050.0));
        assert_eq!(view.author, "Rowan");
    }

    #[test]
    fn build_is_idempotent() {
        let plants = [stored(1, 1_700_000_000.0), stored(2, 1_700_000_000_500.0)];
        let overrides = WeatherOverride {
            weather: Some(Weather::Storm),
            time_offset_hours: -3.5,
        };
        let env = EnvironmentLevels {
            snow_level: 0.25,
            puddle_level: 0.75,
        };
        let now = UnixSeconds(1_700_000_300.0);
        let a = build(now, &overrides, Weather::Storm, env, &plants, 9);
        let b = build(now, &overrides, Weather::Storm, env, &plants, 9);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        // Inputs are untouched.
        assert_eq!(plants[0].created_at_ms, UnixMillis(1_700_000_000.0));
    }
}
