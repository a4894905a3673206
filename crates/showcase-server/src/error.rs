//! Error types for the Showcase server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use showcase_scoring::ScoringError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Converts a store error, reporting unique violations as `Conflict`.
    ///
    /// `context` describes the failed operation, e.g. `"Failed to insert assignment"`.
    pub fn from_store(context: &str, err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            return AppError::Conflict(format!("{}: record already exists", context));
        }
        AppError::Internal(format!("{}: {}", context, err))
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::ProductNotFound(_) => AppError::NotFound(err.to_string()),
            ScoringError::AlreadyAssigned(_) | ScoringError::InvalidTransition { .. } => {
                AppError::Conflict(err.to_string())
            }
            ScoringError::InvalidSubmission(_)
            | ScoringError::InvalidCriterion(_)
            | ScoringError::EmptySelection
            | ScoringError::NotAssignable { .. } => AppError::BadRequest(err.to_string()),
            ScoringError::QrCode(_) | ScoringError::Export(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
