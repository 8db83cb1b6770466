//! User handlers
//!
//! CRUD endpoints for users. Deletion is soft.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{NewUser, User, UserChanges, UserId};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing users
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

/// User as returned over HTTP
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            auth_id: user.auth_id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            deleted_at: user.deleted_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.user_service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users
///
/// Active users only unless `include_deleted=true`.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state
        .user_service
        .find_all_users(query.include_deleted)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.find_first(&UserId(id)).await?;
    Ok(Json(user.into()))
}

/// PUT /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.update_user(&UserId(id), changes).await?;
    Ok(Json(user.into()))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete_user(&UserId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
