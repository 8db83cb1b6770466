//! Wire messages for `timecard.v1.UserService`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{NewUser, User, UserChanges};

/// Seconds and nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub id: String,
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Set only for soft-deleted users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl From<User> for UserMessage {
    fn from(user: User) -> Self {
        Self {
            id: user.id.0,
            auth_id: user.auth_id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
            deleted_at: user.deleted_at.map(Timestamp::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            auth_id: req.auth_id,
            name: req.name,
            email: req.email,
            role: req.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: UserMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersRequest {
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserRequest {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserResponse {
    pub user: UserMessage,
}

/// Fields of the user to update; absent fields keep their value
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub id: String,
    pub auth_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    pub fn into_changes(self) -> (String, UserChanges) {
        (
            self.id,
            UserChanges {
                auth_id: self.auth_id,
                name: self.name,
                email: self.email,
                role: self.role,
            },
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub user: Option<UserUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub user: UserMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserRequest {
    #[serde(default)]
    pub id: String,
}

/// Empty reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}
