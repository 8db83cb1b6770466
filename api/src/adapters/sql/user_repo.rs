//! SQL adapter for UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::entities::{User, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::{classify_db_error, DomainError};

/// SeaORM implementation of UserRepository
pub struct SqlUserRepository {
    db: DatabaseConnection,
}

impl SqlUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// The soft-delete filter applied by every default read and write path
fn active() -> SimpleExpr {
    users::Column::DeletedAt.is_null()
}

fn duplicate(user: &User) -> DomainError {
    DomainError::DuplicateKey(format!(
        "auth_id '{}' or email '{}' is already in use",
        user.auth_id, user.email
    ))
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let model = users::ActiveModel {
            id: Set(user.id.0.clone()),
            auth_id: Set(user.auth_id.clone()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role.clone()),
            created_at: Set(user.created_at.fixed_offset()),
            updated_at: Set(user.updated_at.fixed_offset()),
            deleted_at: Set(user.deleted_at.map(|dt| dt.fixed_offset())),
        };

        users::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| classify_db_error(e, || duplicate(user)))?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::AuthId, Expr::value(user.auth_id.clone()))
            .col_expr(users::Column::Name, Expr::value(user.name.clone()))
            .col_expr(users::Column::Email, Expr::value(user.email.clone()))
            .col_expr(users::Column::Role, Expr::value(user.role.clone()))
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(user.updated_at.fixed_offset()),
            )
            .filter(users::Column::Id.eq(user.id.as_str()))
            .filter(active())
            .exec(&self.db)
            .await
            .map_err(|e| classify_db_error(e, || duplicate(user)))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("User {} not found", user.id)));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, DomainError> {
        let result = users::Entity::find_by_id(id.0.clone())
            .filter(active())
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result
            .map(|m| m.into())
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, DomainError> {
        let mut query = users::Entity::find();
        if !include_deleted {
            query = query.filter(active());
        }

        let results = query
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::DeletedAt, Expr::value(at.fixed_offset()))
            .col_expr(users::Column::UpdatedAt, Expr::value(at.fixed_offset()))
            .filter(users::Column::Id.eq(id.as_str()))
            .filter(active())
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            auth_id: model.auth_id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
