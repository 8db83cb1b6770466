//! Unified error types for the Timecard API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)
//!
//! The RPC surface has its own status type in `crate::rpc`, built from `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - business rule violations and classified store failures
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Already checked in: {0}")]
    AlreadyCheckedIn(String),

    #[error("Not checked in: {0}")]
    NotCheckedIn(String),

    #[error("Check-out before check-in: {0}")]
    CheckOutBeforeCheckIn(String),

    #[error("Already checked out: {0}")]
    AlreadyCheckedOut(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::DuplicateKey(msg)) => {
                (StatusCode::CONFLICT, "Already exists", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyCheckedIn(msg)) => {
                (StatusCode::CONFLICT, "Already checked in", Some(msg.clone()))
            }
            AppError::Domain(DomainError::NotCheckedIn(msg)) => {
                (StatusCode::CONFLICT, "Not checked in", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyCheckedOut(msg)) => {
                (StatusCode::CONFLICT, "Already checked out", Some(msg.clone()))
            }
            AppError::Domain(DomainError::CheckOutBeforeCheckIn(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Check-out before check-in",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

/// Classify a store error, mapping unique-constraint violations to `on_conflict`
pub fn classify_db_error(
    err: sea_orm::DbErr,
    on_conflict: impl FnOnce() -> DomainError,
) -> DomainError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => on_conflict(),
        _ => DomainError::Database(err.to_string()),
    }
}
