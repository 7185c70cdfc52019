//! Visitor commands: planting a seed and protecting a plant.
//!
//! Neither command takes the world lock. Creation is a single insert and
//! protection a single conditional update, so both are atomic per record
//! and can interleave freely with ticks.

use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};
use verdant_types::{NewPlant, Plant, PlantId, UnixSeconds};
use verdant_world::Vitals;
use verdant_world::lifecycle::roll_vitals;

use crate::config::PlantConfig;
use crate::store::{ProtectOutcome, StoreError, WorldStore};

/// Message returned when protecting a plant that already died.
pub const TOO_LATE: &str = "Too late, plant is dead.";

/// Errors returned by garden commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The request was malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The referenced plant does not exist.
    #[error("plant {0} not found")]
    NotFound(PlantId),

    /// The plant exists but cannot accept the command.
    #[error("{0}")]
    InvalidState(String),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A visitor's request to plant a seed.
///
/// Field names follow what the browser client sends.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct PlantRequest {
    /// Horizontal position.
    #[validate(custom(function = "finite"))]
    pub x: f64,

    /// Vertical position.
    #[validate(custom(function = "finite"))]
    pub y: f64,

    /// Stem texture identifier.
    #[serde(rename = "stemTex")]
    #[validate(length(min = 1))]
    pub stem_tex: String,

    /// Leaf texture identifier.
    #[serde(rename = "leafTex")]
    #[validate(length(min = 1))]
    pub leaf_tex: String,

    /// Flower texture identifier.
    #[serde(rename = "flowerTex")]
    #[validate(length(min = 1))]
    pub flower_tex: String,

    /// Optional author label.
    #[serde(default)]
    pub author: Option<String>,
}

fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

impl PlantRequest {
    /// Check the request against the static rules and the configured
    /// limits, returning the author label to store.
    fn checked_author(&self, limits: &PlantConfig) -> Result<String, CommandError> {
        self.validate()
            .map_err(|e| CommandError::Validation(e.to_string()))?;

        for (name, texture) in [
            ("stemTex", &self.stem_tex),
            ("leafTex", &self.leaf_tex),
            ("flowerTex", &self.flower_tex),
        ] {
            if texture.len() > limits.max_texture_len {
                return Err(CommandError::Validation(format!(
                    "{name} exceeds {} bytes",
                    limits.max_texture_len
                )));
            }
        }

        let author = self.author.as_deref().map_or("", str::trim);
        if author.is_empty() {
            return Ok(limits.default_author.clone());
        }
        if author.chars().count() > limits.max_author_len {
            return Err(CommandError::Validation(format!(
                "author exceeds {} characters",
                limits.max_author_len
            )));
        }
        Ok(author.to_owned())
    }
}

/// Draw vitals for a new plant from the thread-local RNG.
pub fn draw_vitals(limits: &PlantConfig) -> Vitals {
    roll_vitals(&mut rand::rng(), &limits.vital_ranges())
}

/// Create a plant from a visitor request.
///
/// The plant starts alive at full health, unprotected, with `vitals`
/// drawn by the caller and a creation stamp of `now` in milliseconds.
pub async fn plant_seed<S: WorldStore>(
    store: &S,
    request: PlantRequest,
    vitals: Vitals,
    now: UnixSeconds,
    limits: &PlantConfig,
) -> Result<Plant, CommandError> {
    let author = request.checked_author(limits)?;
    let plant = store
        .insert_plant(NewPlant {
            x: request.x,
            y: request.y,
            stem_tex: request.stem_tex,
            leaf_tex: request.leaf_tex,
            flower_tex: request.flower_tex,
            author,
            max_health: vitals.max_health,
            vitality: vitals.vitality,
            created_at_ms: now.to_millis(),
        })
        .await?;

    info!(
        plant = %plant.id,
        author = plant.author.as_str(),
        max_health = plant.max_health,
        vitality = plant.vitality,
        "Plant seeded"
    );
    Ok(plant)
}

/// Shield a living plant from hazardous weather for `window_secs` from
/// `now`. Returns the new expiry.
pub async fn protect<S: WorldStore>(
    store: &S,
    id: PlantId,
    now: UnixSeconds,
    window_secs: f64,
) -> Result<UnixSeconds, CommandError> {
    let until = now.plus_secs(window_secs);
    match store.protect_plant(id, until).await? {
        ProtectOutcome::Protected => {
            info!(plant = %id, until = %until, "Plant protected");
            Ok(until)
        }
        ProtectOutcome::NotFound => Err(CommandError::NotFound(id)),
        ProtectOutcome::Dead => Err(CommandError::InvalidState(TOO_LATE.to_owned())),
    }
}
