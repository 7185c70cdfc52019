//! Operator REST handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/admin/update` | Force weather and/or shift the displayed clock |
//! | `GET` | `/api/admin/overrides` | Current overrides and the weather catalogue |
//!
//! These routes carry no authentication; deployments are expected to keep
//! them behind a private network or reverse proxy.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use verdant_core::OverrideRequest;
use verdant_types::{AdminOverview, OverrideState, Weather};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /api/admin/update
// ---------------------------------------------------------------------------

/// Merge a partial override into the world.
///
/// Takes the world lock so the change lands between ticks, never inside
/// one.
pub async fn update_overrides(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OverrideRequest>, JsonRejection>,
) -> Result<Json<OverrideState>, ApiError> {
    let Json(request) = body?;
    let update = request.parse()?;

    let overrides = {
        let mut world = state.world.lock().await;
        update.apply(&mut world.overrides)
    };

    Ok(Json(OverrideState {
        status: "ok".to_owned(),
        overrides,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/admin/overrides
// ---------------------------------------------------------------------------

/// Report the active overrides, the weather in effect and every category
/// an operator may force.
pub async fn get_overrides(State(state): State<Arc<AppState>>) -> Json<AdminOverview> {
    let world = state.world.lock().await;
    Json(AdminOverview {
        overrides: world.overrides,
        weather: world.weather(),
        weather_types: Weather::ALL.to_vec(),
    })
}
