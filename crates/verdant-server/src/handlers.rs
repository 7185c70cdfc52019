//! Visitor-facing REST handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/plant` | Plant a seed |
//! | `POST` | `/api/plant/protect` | Shield a plant for one minute |
//! | `GET` | `/api/updates` | Advance the world and return it |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use verdant_core::{PlantRequest, garden, observe};
use verdant_types::{PlantId, PlantView, ProtectionGrant, UnixMillis, WorldUpdate};
use verdant_world::snapshot;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /api/plant
// ---------------------------------------------------------------------------

/// Plant a seed and return it as clients will see it.
pub async fn create_plant(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PlantRequest>, JsonRejection>,
) -> Result<Json<PlantView>, ApiError> {
    let Json(request) = body?;
    let vitals = garden::draw_vitals(&state.plants);
    let now = state.clock.now();
    let plant = garden::plant_seed(&state.store, request, vitals, now, &state.plants).await?;
    Ok(Json(snapshot::plant_view(&plant)))
}

// ---------------------------------------------------------------------------
// POST /api/plant/protect
// ---------------------------------------------------------------------------

/// Request body for `POST /api/plant/protect`.
#[derive(Debug, Deserialize)]
pub struct ProtectRequest {
    /// Plant to protect.
    pub id: PlantId,
}

/// Protect a living plant from hazardous weather.
pub async fn protect_plant(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProtectRequest>, JsonRejection>,
) -> Result<Json<ProtectionGrant>, ApiError> {
    let Json(request) = body?;
    let now = state.clock.now();
    let until =
        garden::protect(&state.store, request.id, now, state.plants.protection_secs).await?;
    Ok(Json(ProtectionGrant {
        success: true,
        protect_until: until,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/updates
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/updates`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatesQuery {
    /// Only return plants created after this many milliseconds since the
    /// epoch. Anything unparsable counts as 0.
    pub since: Option<String>,
}

impl UpdatesQuery {
    fn since(&self) -> UnixMillis {
        let raw = self
            .since
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        UnixMillis(raw)
    }
}

/// Run one observation tick and return the world.
pub async fn get_updates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpdatesQuery>,
) -> Result<Json<WorldUpdate>, ApiError> {
    let mut update = {
        let mut world = state.world.lock().await;
        let now = state.clock.now();
        observe(&mut world, &state.store, now, &state.rules).await?
    };

    let since = query.since();
    if since.as_f64() > 0.0 {
        update.retain_created_after(since);
    }
    Ok(Json(update))
}
