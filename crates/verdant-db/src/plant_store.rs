//! Plant persistence (`plants` table).
//!
//! Rows map one-to-one onto [`Plant`]. Death causes are stored as the
//! weather's snake-case name; a name this build does not know is reported
//! as corruption rather than silently dropped.

use sqlx::SqlitePool;
use verdant_core::ProtectOutcome;
use verdant_types::{NewPlant, Plant, PlantId, UnixMillis, UnixSeconds, Weather};
use verdant_world::PlantChange;

use crate::counter_store::{self, CounterStore};
use crate::error::DbError;

/// Column list shared by every plant query.
const PLANT_COLUMNS: &str = "id, x, y, stem_tex, leaf_tex, flower_tex, author, created_at_ms, \
     health, max_health, vitality, dead, died_at, death_cause, protected_until, last_saved_health";

/// A row from the `plants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlantRow {
    /// Primary key.
    pub id: i64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Stem texture.
    pub stem_tex: String,
    /// Leaf texture.
    pub leaf_tex: String,
    /// Flower texture.
    pub flower_tex: String,
    /// Author label.
    pub author: String,
    /// Creation stamp as stored (milliseconds, or seconds for old rows).
    pub created_at_ms: f64,
    /// Current health.
    pub health: f64,
    /// Maximum health.
    pub max_health: f64,
    /// Vitality.
    pub vitality: f64,
    /// Death flag.
    pub dead: bool,
    /// Death time in seconds.
    pub died_at: f64,
    /// Killing weather name.
    pub death_cause: Option<String>,
    /// Protection expiry in seconds.
    pub protected_until: f64,
    /// Health at the last write.
    pub last_saved_health: f64,
}

impl TryFrom<PlantRow> for Plant {
    type Error = DbError;

    fn try_from(row: PlantRow) -> Result<Self, Self::Error> {
        let death_cause = row
            .death_cause
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::parse::<Weather>)
            .transpose()
            .map_err(|e| DbError::Corrupt(format!("plant {}: {e}", row.id)))?;

        Ok(Self {
            id: PlantId(row.id),
            x: row.x,
            y: row.y,
            stem_tex: row.stem_tex,
            leaf_tex: row.leaf_tex,
            flower_tex: row.flower_tex,
            author: row.author,
            created_at_ms: UnixMillis(row.created_at_ms),
            health: row.health,
            max_health: row.max_health,
            vitality: row.vitality,
            dead: row.dead,
            died_at: UnixSeconds(row.died_at),
            death_cause,
            protected_until: UnixSeconds(row.protected_until),
            last_saved_health: row.last_saved_health,
        })
    }
}

fn into_plants(rows: Vec<PlantRow>) -> Result<Vec<Plant>, DbError> {
    rows.into_iter().map(Plant::try_from).collect()
}

/// Operations on the `plants` table.
pub struct PlantStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlantStore<'a> {
    /// Create a new plant store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new living plant at full health and return it.
    pub async fn insert(&self, plant: NewPlant) -> Result<Plant, DbError> {
        let result = sqlx::query(
            r"INSERT INTO plants
              (x, y, stem_tex, leaf_tex, flower_tex, author, created_at_ms,
               health, max_health, vitality, dead, died_at, death_cause,
               protected_until, last_saved_health)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, NULL, 0, ?)",
        )
        .bind(plant.x)
        .bind(plant.y)
        .bind(&plant.stem_tex)
        .bind(&plant.leaf_tex)
        .bind(&plant.flower_tex)
        .bind(&plant.author)
        .bind(plant.created_at_ms.as_f64())
        .bind(plant.max_health)
        .bind(plant.max_health)
        .bind(plant.vitality)
        .bind(plant.max_health)
        .execute(self.pool)
        .await?;

        let id = PlantId(result.last_insert_rowid());
        tracing::debug!(plant = %id, "Inserted plant");

        Ok(Plant {
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
        })
    }

    /// Fetch one plant.
    pub async fn get(&self, id: PlantId) -> Result<Option<Plant>, DbError> {
        let row = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE id = ?"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(Plant::try_from).transpose()
    }

    /// Every plant, in creation order.
    pub async fn all(&self) -> Result<Vec<Plant>, DbError> {
        let rows = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        into_plants(rows)
    }

    /// Every living plant, in creation order.
    pub async fn living(&self) -> Result<Vec<Plant>, DbError> {
        let rows = sqlx::query_as::<_, PlantRow>(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE dead = 0 ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        into_plants(rows)
    }

    /// Write integrated health and lifecycle fields in one transaction.
    ///
    /// `protected_until` is deliberately absent from the update so a
    /// concurrent protection request is never overwritten.
    pub async fn save_changes(&self, changes: &[PlantChange]) -> Result<(), DbError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for change in changes {
            sqlx::query(
                r"UPDATE plants
                  SET health = ?, last_saved_health = ?, dead = ?, died_at = ?, death_cause = ?
                  WHERE id = ?",
            )
            .bind(change.health)
            .bind(change.health)
            .bind(change.dead)
            .bind(change.died_at.as_f64())
            .bind(change.death_cause.map(Weather::as_str))
            .bind(change.id.into_inner())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(count = changes.len(), "Saved plant changes");
        Ok(())
    }

    /// Delete plants that died before `cutoff` and add them to the death
    /// counter, in one transaction. Returns the number deleted.
    pub async fn evict_dead(&self, cutoff: UnixSeconds) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let evicted = sqlx::query(r"DELETE FROM plants WHERE dead = 1 AND died_at < ?")
            .bind(cutoff.as_f64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if evicted > 0 {
            CounterStore::add_on(&mut *tx, counter_store::DEATHS, evicted).await?;
        }
        tx.commit().await?;

        Ok(evicted)
    }

    /// Set `protected_until` if the plant exists and is alive.
    ///
    /// The update is a single conditional statement; the follow-up lookup
    /// only tells an unknown id apart from a dead plant.
    pub async fn protect(&self, id: PlantId, until: UnixSeconds) -> Result<ProtectOutcome, DbError> {
        let updated = sqlx::query(r"UPDATE plants SET protected_until = ? WHERE id = ? AND dead = 0")
            .bind(until.as_f64())
            .bind(id.into_inner())
            .execute(self.pool)
            .await?
            .rows_affected();

        if updated > 0 {
            return Ok(ProtectOutcome::Protected);
        }

        let exists: Option<i64> = sqlx::query_scalar(r"SELECT id FROM plants WHERE id = ?")
            .bind(id.into_inner())
            .fetch_optional(self.pool)
            .await?;

        Ok(exists.map_or(ProtectOutcome::NotFound, |_| ProtectOutcome::Dead))
    }
}
