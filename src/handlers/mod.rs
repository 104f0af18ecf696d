pub mod faculties;
pub mod stats;
pub mod students;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::catalog::CatalogError;
use crate::tracking::{StoreError, TrackingError};

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// A tracked call failed; carries the original cause's message.
    #[error("{0}")]
    Instrumentation(String),

    #[error("sample store: {0}")]
    Store(#[from] StoreError),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        // A missing entity stays a 404 even when it came through the interceptor
        if let Some(catalog_err) = err.cause_as::<CatalogError>() {
            return Self::NotFound(catalog_err.to_string());
        }
        match err {
            TrackingError::Store(e) => Self::Store(e),
            TrackingError::Instrumentation { source, .. } => {
                Self::Instrumentation(source.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Instrumentation(msg) => {
                error!(cause = %msg, "instrumented call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Store(e) => {
                error!(error = %e, "sample store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error":  self.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
