//! Configuration loading and typed config structures for the Verdant garden.
//!
//! The canonical configuration lives in `verdant-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file) yields a
//! working garden with the standard rules.
//!
//! | Section | Contents |
//! |---------|----------|
//! | `server` | Bind address and port |
//! | `database` | `SQLite` URL and pool sizing |
//! | `weather` | Rotation interval, calm weight, RNG seed |
//! | `environment` | Snow and puddle rates |
//! | `plants` | Damage, regrowth, eviction, protection, vitals, input limits |
//! | `logging` | Level and output format |

use std::path::Path;

use serde::Deserialize;
use verdant_world::{EnvironmentRates, LifecycleRules, RotationRules, VitalRanges};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level garden configuration, mirroring `verdant-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GardenConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Weather rotation rules.
    #[serde(default)]
    pub weather: RotationRules,

    /// Environment accumulation rates.
    #[serde(default)]
    pub environment: EnvironmentRates,

    /// Plant lifecycle and creation rules.
    #[serde(default)]
    pub plants: PlantConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GardenConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DATABASE_URL` overrides `database.url`
    /// - `VERDANT_PORT` overrides `server.port`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides
    /// and validate the result.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override connection settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("VERDANT_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("VERDANT_PORT '{val}' is not a port: {e}"),
            })?;
        }
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weather = &self.weather;
        if !(weather.rotation_secs.is_finite() && weather.rotation_secs > 0.0) {
            return Err(invalid("weather.rotation_secs must be positive"));
        }
        if !(weather.calm_weight > 0.0 && weather.calm_weight < 1.0) {
            return Err(invalid("weather.calm_weight must lie strictly between 0 and 1"));
        }
        if self
            .environment
            .all()
            .iter()
            .any(|rate| !rate.is_finite() || *rate < 0.0)
        {
            return Err(invalid("environment rates must be finite and non-negative"));
        }

        let plants = &self.plants;
        for (name, value) in [
            ("plants.damage_per_sec", plants.damage_per_sec),
            ("plants.regrowth_per_vitality", plants.regrowth_per_vitality),
            ("plants.eviction_grace_secs", plants.eviction_grace_secs),
            ("plants.protection_secs", plants.protection_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(&format!("{name} must be positive")));
            }
        }
        if !(plants.persist_threshold.is_finite() && plants.persist_threshold >= 0.0) {
            return Err(invalid("plants.persist_threshold must be non-negative"));
        }
        if ![
            plants.max_health_min,
            plants.max_health_max,
            plants.vitality_min,
            plants.vitality_max,
        ]
        .iter()
        .all(|bound| bound.is_finite())
        {
            return Err(invalid("plants vital ranges must be finite"));
        }
        if !(plants.max_health_min > 0.0 && plants.max_health_min <= plants.max_health_max) {
            return Err(invalid("plants.max_health range is empty or inverted"));
        }
        if !(plants.vitality_min > 0.0 && plants.vitality_min <= plants.vitality_max) {
            return Err(invalid("plants.vitality range is empty or inverted"));
        }
        if plants.max_texture_len == 0 || plants.max_author_len == 0 {
            return Err(invalid("plants input limits must be at least 1"));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Plant rules: lifecycle, protection, vitals and request limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlantConfig {
    /// Health lost per second under hazardous weather.
    #[serde(default = "default_damage_per_sec")]
    pub damage_per_sec: f64,

    /// Health regained per second per point of vitality.
    #[serde(default = "default_regrowth_per_vitality")]
    pub regrowth_per_vitality: f64,

    /// Minimum health drift before a living plant is rewritten.
    #[serde(default = "default_persist_threshold")]
    pub persist_threshold: f64,

    /// Seconds a dead plant stays visible before eviction.
    #[serde(default = "default_eviction_grace_secs")]
    pub eviction_grace_secs: f64,

    /// Length of a protection window in seconds.
    #[serde(default = "default_protection_secs")]
    pub protection_secs: f64,

    /// Lower bound for a new plant's maximum health.
    #[serde(default = "default_max_health_min")]
    pub max_health_min: f64,

    /// Upper bound for a new plant's maximum health.
    #[serde(default = "default_max_health_max")]
    pub max_health_max: f64,

    /// Lower bound for a new plant's vitality.
    #[serde(default = "default_vitality_min")]
    pub vitality_min: f64,

    /// Upper bound for a new plant's vitality.
    #[serde(default = "default_vitality_max")]
    pub vitality_max: f64,

    /// Author label used when a request gives none.
    #[serde(default = "default_author")]
    pub default_author: String,

    /// Maximum length of a texture identifier in bytes.
    #[serde(default = "default_max_texture_len")]
    pub max_texture_len: usize,

    /// Maximum length of an author label in characters.
    #[serde(default = "default_max_author_len")]
    pub max_author_len: usize,
}

impl PlantConfig {
    /// The lifecycle constants for the simulation.
    pub const fn lifecycle(&self) -> LifecycleRules {
        LifecycleRules {
            damage_per_sec: self.damage_per_sec,
            regrowth_per_vitality: self.regrowth_per_vitality,
            persist_threshold: self.persist_threshold,
            eviction_grace_secs: self.eviction_grace_secs,
        }
    }

    /// The ranges new plants draw their vitals from.
    pub const fn vital_ranges(&self) -> VitalRanges {
        VitalRanges {
            max_health_min: self.max_health_min,
            max_health_max: self.max_health_max,
            vitality_min: self.vitality_min,
            vitality_max: self.vitality_max,
        }
    }
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            damage_per_sec: default_damage_per_sec(),
            regrowth_per_vitality: default_regrowth_per_vitality(),
            persist_threshold: default_persist_threshold(),
            eviction_grace_secs: default_eviction_grace_secs(),
            protection_secs: default_protection_secs(),
            max_health_min: default_max_health_min(),
            max_health_max: default_max_health_max(),
            vitality_min: default_vitality_min(),
            vitality_max: default_vitality_max(),
            default_author: default_author(),
            max_texture_len: default_max_texture_len(),
            max_author_len: default_max_author_len(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "sqlite://verdant.db?mode=rwc".to_owned()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_damage_per_sec() -> f64 {
    LifecycleRules::default().damage_per_sec
}

fn default_regrowth_per_vitality() -> f64 {
    LifecycleRules::default().regrowth_per_vitality
}

fn default_persist_threshold() -> f64 {
    LifecycleRules::default().persist_threshold
}

fn default_eviction_grace_secs() -> f64 {
    LifecycleRules::default().eviction_grace_secs
}

const fn default_protection_secs() -> f64 {
    60.0
}

fn default_max_health_min() -> f64 {
    VitalRanges::default().max_health_min
}

fn default_max_health_max() -> f64 {
    VitalRanges::default().max_health_max
}

fn default_vitality_min() -> f64 {
    VitalRanges::default().vitality_min
}

fn default_vitality_max() -> f64 {
    VitalRanges::default().vitality_max
}

fn default_author() -> String {
    "Anonymous".to_owned()
}

const fn default_max_texture_len() -> usize {
    2 * 1024 * 1024
}

const fn default_max_author_len() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_owned()
}
