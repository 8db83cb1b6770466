//! SQL adapters
//!
//! Implementations of repository traits using SeaORM. PostgreSQL is the
//! production backend; SQLite works for local runs and adapter tests.

pub mod attendance_repo;
pub mod user_repo;


use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::entity::{attendance, users};

pub use attendance_repo::SqlAttendanceRepository;
pub use user_repo::SqlUserRepository;

/// Create the tables if they do not exist yet.
///
/// The schema is derived from the SeaORM entities, including the unique
/// columns on `users` and the `(user_id, date)` primary key on `attendance`.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut users_table = schema.create_table_from_entity(users::Entity);
    users_table.if_not_exists();
    db.execute(backend.build(&users_table)).await?;

    let mut attendance_table = schema.create_table_from_entity(attendance::Entity);
    attendance_table.if_not_exists();
    db.execute(backend.build(&attendance_table)).await?;

    tracing::debug!("Schema is up to date");
    Ok(())
}
