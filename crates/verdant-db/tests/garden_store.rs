//! Integration tests for the `verdant-db` data layer.
//!
//! Each test runs against a fresh in-memory `SQLite` database, so no
//! external services are needed.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use verdant_core::{ProtectOutcome, StoreError, WorldStore};
use verdant_db::{CounterStore, GardenStore, PlantStore, SqliteDb};
use verdant_types::{NewPlant, PlantId, UnixMillis, UnixSeconds, Weather};
use verdant_world::PlantChange;

// =============================================================================
// Helpers
// =============================================================================

async fn setup() -> GardenStore {
    let db = SqliteDb::connect_url("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    db.run_migrations().await.expect("Failed to run migrations");
    GardenStore::new(db)
}

fn new_plant(author: &str) -> NewPlant {
    NewPlant {
        x: 120.5,
        y: 40.0,
        stem_tex: String::from("data:stem"),
        leaf_tex: String::from("data:leaf"),
        flower_tex: String::from("data:flower"),
        author: author.to_owned(),
        max_health: 180.0,
        vitality: 1.75,
        created_at_ms: UnixMillis(1_700_000_000_123.0),
    }
}

fn death(id: PlantId, at: f64, cause: Weather) -> PlantChange {
    PlantChange {
        id,
        health: 0.0,
        dead: true,
        died_at: UnixSeconds(at),
        death_cause: Some(cause),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn insert_assigns_ids_and_round_trips() {
    let store = setup().await;
    let first = store.insert_plant(new_plant("Fern")).await.unwrap();
    let second = store.insert_plant(new_plant("Moss")).await.unwrap();
    assert!(second.id > first.id);

    let all = store.all_plants().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], first);
    assert_eq!(all[1].author, "Moss");
    assert_eq!(all[0].health, 180.0);
    assert_eq!(all[0].protected_until, UnixSeconds::EPOCH);
    assert_eq!(all[0].created_at_ms, UnixMillis(1_700_000_000_123.0));
}

#[tokio::test]
async fn fresh_database_has_zero_deaths() {
    let store = setup().await;
    assert_eq!(store.death_count().await.unwrap(), Some(0));
}

#[tokio::test]
async fn changes_are_saved_and_dead_plants_leave_living_set() {
    let store = setup().await;
    let a = store.insert_plant(new_plant("A")).await.unwrap();
    let b = store.insert_plant(new_plant("B")).await.unwrap();

    store
        .save_plant_changes(&[
            PlantChange {
                id: a.id,
                health: 150.0,
                dead: false,
                died_at: UnixSeconds::EPOCH,
                death_cause: None,
            },
            death(b.id, 1000.0, Weather::Tornado),
        ])
        .await
        .unwrap();

    let living = store.living_plants().await.unwrap();
    assert_eq!(living.len(), 1);
    assert_eq!(living[0].health, 150.0);
    assert_eq!(living[0].last_saved_health, 150.0);

    let dead = PlantStore::new(store.db().pool())
        .get(b.id)
        .await
        .unwrap()
        .unwrap();
    assert!(dead.dead);
    assert_eq!(dead.death_cause, Some(Weather::Tornado));
    assert_eq!(dead.died_at, UnixSeconds(1000.0));
}

#[tokio::test]
async fn eviction_deletes_and_counts_once() {
    let store = setup().await;
    let old = store.insert_plant(new_plant("old")).await.unwrap();
    let recent = store.insert_plant(new_plant("recent")).await.unwrap();
    let alive = store.insert_plant(new_plant("alive")).await.unwrap();
    store
        .save_plant_changes(&[
            death(old.id, 1000.0, Weather::Storm),
            death(recent.id, 1005.0, Weather::Hail),
        ])
        .await
        .unwrap();

    // Cutoff 1002: only the plant dead since 1000 goes.
    assert_eq!(store.evict_dead(UnixSeconds(1002.0)).await.unwrap(), 1);
    assert_eq!(store.death_count().await.unwrap(), Some(1));

    // Repeating the same cutoff evicts nothing more.
    assert_eq!(store.evict_dead(UnixSeconds(1002.0)).await.unwrap(), 0);
    assert_eq!(store.death_count().await.unwrap(), Some(1));

    assert_eq!(store.evict_dead(UnixSeconds(2000.0)).await.unwrap(), 1);
    assert_eq!(store.death_count().await.unwrap(), Some(2));

    let remaining = store.all_plants().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, alive.id);
}

#[tokio::test]
async fn protect_distinguishes_missing_and_dead() {
    let store = setup().await;
    let alive = store.insert_plant(new_plant("alive")).await.unwrap();
    let dead = store.insert_plant(new_plant("dead")).await.unwrap();
    store
        .save_plant_changes(&[death(dead.id, 10.0, Weather::Blizzard)])
        .await
        .unwrap();

    let until = UnixSeconds(1_700_000_060.0);
    assert_eq!(
        store.protect_plant(alive.id, until).await.unwrap(),
        ProtectOutcome::Protected
    );
    assert_eq!(
        store.protect_plant(dead.id, until).await.unwrap(),
        ProtectOutcome::Dead
    );
    assert_eq!(
        store.protect_plant(PlantId(9999), until).await.unwrap(),
        ProtectOutcome::NotFound
    );

    let plants = store.all_plants().await.unwrap();
    assert_eq!(plants[0].protected_until, until);
    assert_eq!(plants[1].protected_until, UnixSeconds::EPOCH);
}

#[tokio::test]
async fn tick_writes_do_not_clobber_protection() {
    let store = setup().await;
    let plant = store.insert_plant(new_plant("p")).await.unwrap();
    store
        .protect_plant(plant.id, UnixSeconds(5000.0))
        .await
        .unwrap();

    store
        .save_plant_changes(&[PlantChange {
            id: plant.id,
            health: 170.0,
            dead: false,
            died_at: UnixSeconds::EPOCH,
            death_cause: None,
        }])
        .await
        .unwrap();

    let stored = store.living_plants().await.unwrap();
    assert_eq!(stored[0].protected_until, UnixSeconds(5000.0));
    assert_eq!(stored[0].health, 170.0);
}

#[tokio::test]
async fn legacy_second_stamps_are_kept_verbatim() {
    let store = setup().await;
    sqlx::query(
        r"INSERT INTO plants
          (x, y, stem_tex, leaf_tex, flower_tex, author, created_at_ms,
           health, max_health, vitality, last_saved_health)
          VALUES (0, 0, 's', 'l', 'f', 'old-timer', 1700000000, 90, 90, 1.0, 90)",
    )
    .execute(store.db().pool())
    .await
    .unwrap();

    let plants = store.all_plants().await.unwrap();
    // Upgrading to milliseconds happens in the snapshot, not in storage.
    assert_eq!(plants[0].created_at_ms, UnixMillis(1_700_000_000.0));
    assert_eq!(
        verdant_world::snapshot::plant_view(&plants[0]).server_time,
        UnixMillis(1_700_000_000_000.0)
    );
}

#[tokio::test]
async fn unknown_death_cause_is_corrupt() {
    let store = setup().await;
    sqlx::query(
        r"INSERT INTO plants
          (x, y, stem_tex, leaf_tex, flower_tex, author, created_at_ms,
           health, max_health, vitality, dead, died_at, death_cause, last_saved_health)
          VALUES (0, 0, 's', 'l', 'f', 'a', 0, 0, 90, 1.0, 1, 5, 'acid_rain', 0)",
    )
    .execute(store.db().pool())
    .await
    .unwrap();

    let err = store.all_plants().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[tokio::test]
async fn missing_counter_row_reads_as_none() {
    let store = setup().await;
    sqlx::query(r"DELETE FROM counters")
        .execute(store.db().pool())
        .await
        .unwrap();

    assert_eq!(store.death_count().await.unwrap(), None);
    assert_eq!(
        CounterStore::new(store.db().pool()).get("deaths").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn eviction_without_counter_row_still_deletes() {
    let store = setup().await;
    let plant = store.insert_plant(new_plant("gone")).await.unwrap();
    store
        .save_plant_changes(&[death(plant.id, 10.0, Weather::Storm)])
        .await
        .unwrap();
    sqlx::query(r"DELETE FROM counters")
        .execute(store.db().pool())
        .await
        .unwrap();

    assert_eq!(store.evict_dead(UnixSeconds(100.0)).await.unwrap(), 1);
    assert!(store.all_plants().await.unwrap().is_empty());
    // The row is not silently recreated with a partial count.
    assert_eq!(store.death_count().await.unwrap(), None);
}

#[tokio::test]
async fn counter_increment_reports_missing_row() {
    let store = setup().await;
    let mut conn = store.db().pool().acquire().await.unwrap();

    assert!(CounterStore::add_on(&mut *conn, "deaths", 2).await.unwrap());
    assert!(!CounterStore::add_on(&mut *conn, "absent", 2).await.unwrap());
    drop(conn);

    assert_eq!(store.death_count().await.unwrap(), Some(2));
    assert_eq!(
        CounterStore::new(store.db().pool()).get("absent").await.unwrap(),
        None
    );
}
