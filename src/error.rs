//! Application error type shared across all layers.
//!
//! Synchronous paths (link creation, lookup, stats) propagate [`AppError`]
//! up to the HTTP boundary where it is translated into a JSON response.
//! Asynchronous paths (click workers, the URL monitor) never surface errors
//! anywhere except logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Error taxonomy for the whole service.
///
/// - `Validation` - malformed input, rejected at the boundary
/// - `NotFound` - lookup by short code found nothing; kept distinct from
///   other storage errors so callers can answer 404 instead of 500
/// - `Conflict` - a store-level uniqueness violation; link creation treats
///   this as a retryable short-code collision
/// - `Internal` - everything else, including short-code exhaustion
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Maps database errors onto the application taxonomy.
///
/// A unique-constraint violation becomes [`AppError::Conflict`]; the link
/// creation retry loop relies on this to detect short-code races that slip
/// past the pre-check.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    AppError::internal("Database error", json!({ "source": e.to_string() }))
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}
