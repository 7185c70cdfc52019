//! HTTP API for the Verdant garden.
//!
//! Browsers poll `GET /api/updates` to see the garden; each poll advances
//! the world by the time since the previous one. Visitors plant seeds and
//! protect plants through `POST` endpoints, and an operator can force the
//! weather or shift the displayed clock.
//!
//! # Architecture
//!
//! All handlers share one [`AppState`]. The observation tick runs under the
//! world mutex; the visitor commands go straight to the store and rely on
//! single-statement atomicity there.

pub mod admin;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
