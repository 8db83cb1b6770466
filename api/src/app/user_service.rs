//! User service
//!
//! Owns the user lifecycle decisions the repository must not make:
//! identifier and timestamp assignment, input validation and soft deletion.

use std::sync::Arc;

use crate::domain::entities::{NewUser, User, UserChanges, UserId};
use crate::domain::ports::UserRepository;
use crate::error::AppError;

use super::now;

/// Service for managing users
pub struct UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    users: Arc<UR>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository + ?Sized,
{
    pub fn new(users: Arc<UR>) -> Self {
        Self { users }
    }

    /// Create a user with a fresh identifier.
    ///
    /// A clash on auth id or email surfaces as `DomainError::DuplicateKey`.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        new_user.validate()?;

        let timestamp = now();
        let user = User {
            id: UserId::new(),
            auth_id: new_user.auth_id,
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        };

        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "Created user");

        Ok(user)
    }

    /// Apply `changes` to an active user and refresh its update timestamp
    pub async fn update_user(&self, id: &UserId, changes: UserChanges) -> Result<User, AppError> {
        let mut user = self.users.find_by_id(id).await?;

        user.apply(changes);
        user.validate()?;
        user.updated_at = now();

        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "Updated user");

        Ok(user)
    }

    /// Find an active user by ID
    pub async fn find_first(&self, id: &UserId) -> Result<User, AppError> {
        Ok(self.users.find_by_id(id).await?)
    }

    /// List users; soft-deleted ones only when asked for
    pub async fn find_all_users(&self, include_deleted: bool) -> Result<Vec<User>, AppError> {
        Ok(self.users.find_all(include_deleted).await?)
    }

    /// Soft-delete a user. Attendance history is left untouched.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), AppError> {
        self.users.soft_delete(id, now()).await?;
        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
