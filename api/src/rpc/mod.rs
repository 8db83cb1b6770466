//! RPC surface
//!
//! `timecard.v1.UserService` as typed JSON messages, one POST route per
//! method under `/rpc/timecard.v1.UserService/`. Failures carry a status
//! code in the body and a matching HTTP status.

pub mod messages;
pub mod user_service;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, DomainError};
use crate::AppState;

pub const SERVICE_PATH: &str = "/rpc/timecard.v1.UserService";

/// Routes for every `UserService` method
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/CreateUser", SERVICE_PATH),
            post(user_service::create_user),
        )
        .route(
            &format!("{}/ListUsers", SERVICE_PATH),
            post(user_service::list_users),
        )
        .route(
            &format!("{}/GetUser", SERVICE_PATH),
            post(user_service::get_user),
        )
        .route(
            &format!("{}/UpdateUser", SERVICE_PATH),
            post(user_service::update_user),
        )
        .route(
            &format!("{}/DeleteUser", SERVICE_PATH),
            post(user_service::delete_user),
        )
}

/// JSON request message; an unreadable body is answered as `invalid_argument`
pub struct RpcJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for RpcJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = RpcStatus;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(message) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| RpcStatus::invalid_argument(rejection.body_text()))?;
        Ok(Self(message))
    }
}

/// RPC status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    NotFound,
    InvalidArgument,
    FailedPrecondition,
    Internal,
}

impl Code {
    pub fn http_status(self) -> StatusCode {
        match self {
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::FailedPrecondition => StatusCode::CONFLICT,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body of a failed RPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: Code,
    pub message: String,
}

impl RpcStatus {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: Code::InvalidArgument,
            message: message.into(),
        }
    }
}

impl From<AppError> for RpcStatus {
    fn from(err: AppError) -> Self {
        let code = match &err {
            AppError::Domain(DomainError::NotFound(_)) => Code::NotFound,
            AppError::Domain(DomainError::DuplicateKey(_))
            | AppError::Domain(DomainError::Validation(_))
            | AppError::BadRequest(_) => Code::InvalidArgument,
            AppError::Domain(DomainError::AlreadyCheckedIn(_))
            | AppError::Domain(DomainError::NotCheckedIn(_))
            | AppError::Domain(DomainError::AlreadyCheckedOut(_))
            | AppError::Domain(DomainError::CheckOutBeforeCheckIn(_)) => Code::FailedPrecondition,
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                return Self {
                    code: Code::Internal,
                    message: "internal error".to_string(),
                };
            }
        };

        Self {
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for RpcStatus {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}
