//! Named integer counters (`counters` table).
//!
//! Only `deaths` exists today: the number of dead plants evicted since the
//! garden was created.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbError;

/// Counter key for evicted plants.
pub const DEATHS: &str = "deaths";

/// Operations on the `counters` table.
pub struct CounterStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CounterStore<'a> {
    /// Create a new counter store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Read a counter. `None` if the row does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<u64>, DbError> {
        let value: Option<i64> = sqlx::query_scalar(r"SELECT value FROM counters WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        value
            .map(|v| {
                u64::try_from(v)
                    .map_err(|_| DbError::Corrupt(format!("counter {key} is negative: {v}")))
            })
            .transpose()
    }

    /// Add `delta` to a counter on an open connection or transaction.
    ///
    /// A missing row is not recreated: that would restart the count from
    /// `delta` and hide the loss. The dropped amount is logged instead and
    /// `false` returned.
    pub async fn add_on(
        conn: &mut SqliteConnection,
        key: &str,
        delta: u64,
    ) -> Result<bool, DbError> {
        let amount = i64::try_from(delta).unwrap_or(i64::MAX);
        let updated = sqlx::query(r"UPDATE counters SET value = value + ? WHERE key = ?")
            .bind(amount)
            .bind(key)
            .execute(conn)
            .await?
            .rows_affected();

        if updated == 0 {
            tracing::warn!(counter = key, dropped = delta, "Counter row missing; increment lost");
            return Ok(false);
        }
        Ok(true)
    }
}
