//! Axum router construction for the garden API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser client and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /api/plant` -- plant a seed
/// - `POST /api/plant/protect` -- protect a plant
/// - `GET /api/updates` -- advance and observe the world
/// - `POST /api/admin/update` -- update operator overrides
/// - `GET /api/admin/overrides` -- read operator overrides
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Visitors
        .route("/api/plant", post(handlers::create_plant))
        .route("/api/plant/protect", post(handlers::protect_plant))
        .route("/api/updates", get(handlers::get_updates))
        // Operator
        .route("/api/admin/update", post(admin::update_overrides))
        .route("/api/admin/overrides", get(admin::get_overrides))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
