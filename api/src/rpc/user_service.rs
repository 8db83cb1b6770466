//! `timecard.v1.UserService` method handlers

use axum::{extract::State, Json};

use super::messages::{
    CreateUserRequest, CreateUserResponse, DeleteUserRequest, Empty, GetUserRequest,
    GetUserResponse, ListUsersRequest, ListUsersResponse, UpdateUserRequest, UpdateUserResponse,
    UserMessage,
};
use super::{RpcJson, RpcStatus};
use crate::domain::entities::UserId;
use crate::AppState;

fn require_id(id: String) -> Result<UserId, RpcStatus> {
    if id.trim().is_empty() {
        return Err(RpcStatus::invalid_argument("id required"));
    }
    Ok(UserId(id))
}

/// CreateUser
pub async fn create_user(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, RpcStatus> {
    let user = state.user_service.create_user(req.into()).await?;
    Ok(Json(CreateUserResponse { user: user.into() }))
}

/// ListUsers
pub async fn list_users(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<ListUsersRequest>,
) -> Result<Json<ListUsersResponse>, RpcStatus> {
    let users = state
        .user_service
        .find_all_users(req.include_deleted)
        .await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserMessage::from).collect(),
    }))
}

/// GetUser
pub async fn get_user(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<GetUserRequest>,
) -> Result<Json<GetUserResponse>, RpcStatus> {
    let id = require_id(req.id)?;
    let user = state.user_service.find_first(&id).await?;
    Ok(Json(GetUserResponse { user: user.into() }))
}

/// UpdateUser
pub async fn update_user(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<UpdateUserRequest>,
) -> Result<Json<UpdateUserResponse>, RpcStatus> {
    let update = req
        .user
        .ok_or_else(|| RpcStatus::invalid_argument("user required"))?;
    let (id, changes) = update.into_changes();
    let id = require_id(id)?;

    let user = state.user_service.update_user(&id, changes).await?;
    Ok(Json(UpdateUserResponse { user: user.into() }))
}

/// DeleteUser
pub async fn delete_user(
    State(state): State<AppState>,
    RpcJson(req): RpcJson<DeleteUserRequest>,
) -> Result<Json<Empty>, RpcStatus> {
    let id = require_id(req.id)?;
    state.user_service.delete_user(&id).await?;
    Ok(Json(Empty {}))
}
