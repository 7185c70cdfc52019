//! Server binary for the Verdant garden.
//!
//! Wires configuration, logging, the `SQLite` store and the HTTP API
//! together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$VERDANT_CONFIG` or `verdant-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the `SQLite` database and run migrations
//! 4. Build the shared world state on the system clock
//! 5. Serve the garden API
//! 6. Close the database

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;
use verdant_core::config::LoggingConfig;
use verdant_core::{GardenConfig, LogFormat, SystemClock};
use verdant_db::{GardenStore, SqliteConfig, SqliteDb};
use verdant_server::AppState;

const DEFAULT_CONFIG_PATH: &str = "verdant-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging depends on it, so report afterwards.
    let path = config_path();
    let (config, from_file) = load_config(&path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        path = %path.display(),
        from_file,
        port = config.server.port,
        "verdant-engine starting"
    );

    // 3. Open the database.
    let db_config = SqliteConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs));
    let db = SqliteDb::connect(&db_config)
        .await
        .context("failed to open the garden database")?;
    db.run_migrations()
        .await
        .context("failed to migrate the garden database")?;

    // 4. Build world state.
    let state = Arc::new(AppState::new(
        GardenStore::new(db),
        &config,
        Arc::new(SystemClock),
    ));
    info!(
        weather = %state.world.lock().await.weather(),
        "World state initialized"
    );

    // 5. Serve until shutdown.
    verdant_server::start_server(&config.server, Arc::clone(&state))
        .await
        .context("garden server failed")?;

    // 6. Release the database.
    state.store.db().close().await;
    info!("verdant-engine shutdown complete");
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os("VERDANT_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the garden configuration, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> anyhow::Result<(GardenConfig, bool)> {
    if path.exists() {
        let config = GardenConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok((config, true))
    } else {
        let config = GardenConfig::parse("").context("invalid default configuration")?;
        Ok((config, false))
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
