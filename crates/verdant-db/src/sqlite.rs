//! `SQLite` connection pool.
//!
//! `SQLite` holds every plant and the eviction counter. Queries are built
//! at runtime (not compile-time checked) so no database is needed at build
//! time, and every query is parameterized.

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Connection URL, e.g. `sqlite://verdant.db?mode=rwc` or
    /// `sqlite::memory:`.
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Time to wait for a free connection.
    pub connect_timeout: Duration,
}

impl SqliteConfig {
    /// Create a new configuration from a database URL.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Connection pool handle to the garden database.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pool: sqlx::SqlitePool,
}

impl SqliteDb {
    /// Connect using the provided configuration.
    ///
    /// An in-memory database lives only as long as its connection, so for
    /// `sqlite::memory:` the pool is pinned to one connection that never
    /// idles out.
    pub async fn connect(config: &SqliteConfig) -> Result<Self, DbError> {
        let connect_options: SqliteConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| DbError::Config(format!("Invalid database URL: {e}")))?;

        let in_memory = config.url.contains(":memory:");
        let mut options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { config.max_connections })
            .acquire_timeout(config.connect_timeout);
        if in_memory {
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options.connect_with(connect_options).await?;

        tracing::info!(
            max_connections = config.max_connections,
            in_memory,
            "Connected to SQLite"
        );

        Ok(Self { pool })
    }

    /// Connect using a database URL string with default pool settings.
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        Self::connect(&SqliteConfig::new(url)).await
    }

    /// Run all pending migrations from the `migrations/` directory.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying pool.
    pub const fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite pool closed");
    }
}
