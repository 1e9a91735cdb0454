//! Engine error surface
//!
//! Every failure is a deterministic input-validation result, surfaced
//! synchronously and never retried. The HTTP layer converts these into the
//! standard JSON error body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced while compiling query-string filters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Malformed or disallowed raw input
    #[error("Invalid parameter: {0}")]
    InvalidArgument(String),

    /// A fragment builder broke the placeholder/value contract. This is a
    /// programming error in the resource layer, never user input.
    #[error("Invalid clause: {0}")]
    InvalidClause(String),

    /// Timestamp/range consolidation failure
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl QueryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_clause(message: impl Into<String>) -> Self {
        Self::InvalidClause(message.into())
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = match &self {
            Self::InvalidArgument(_) => {
                (StatusCode::BAD_REQUEST, "bad_request", "INVALID_ARGUMENT")
            }
            Self::InvalidRange(_) => (StatusCode::BAD_REQUEST, "bad_request", "INVALID_RANGE"),
            Self::InvalidClause(_) => {
                tracing::error!(error = %self, "clause contract violation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "INVALID_CLAUSE",
                )
            }
        };
        let message = self.to_string();
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
