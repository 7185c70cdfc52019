//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": <message>, "status": <code>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use verdant_core::{CommandError, StoreError, TickError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or query was malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource exists but cannot accept the request.
    #[error("{0}")]
    InvalidState(String),

    /// The database could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Stored data could not be read.
    #[error("corrupt data: {0}")]
    Corrupt(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => Self::Corrupt(msg),
        }
    }
}

impl From<TickError> for ApiError {
    fn from(err: TickError) -> Self {
        match err {
            TickError::Store(e) => e.into(),
        }
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Validation(msg) => Self::Validation(msg),
            CommandError::NotFound(_) => Self::NotFound("Plant not found".to_owned()),
            CommandError::InvalidState(msg) => Self::InvalidState(msg),
            CommandError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) | Self::InvalidState(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::StoreUnavailable(msg) => {
                tracing::error!(error = msg.as_str(), "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage temporarily unavailable".to_owned(),
                )
            }
            Self::Corrupt(msg) => {
                tracing::error!(error = msg.as_str(), "Corrupt stored data");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "stored data could not be read".to_owned(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
