//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (SQL via SeaORM, in-memory for tests).
//!
//! Repositories enforce only what the store enforces by construction: primary
//! keys, unique columns and the check-in/check-out ordering of a single row.
//! Every other rule lives in the application services.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::{Attendance, User, UserId};
use crate::error::DomainError;

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// Fails with `DuplicateKey` when the auth id or email is already taken.
    async fn create(&self, user: &User) -> Result<(), DomainError>;

    /// Overwrite the mutable fields of an active user.
    ///
    /// Fails with `NotFound` when the user is absent or soft-deleted.
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Find an active user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<User, DomainError>;

    /// List users ordered by creation time, soft-deleted ones only on request
    async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, DomainError>;

    /// Mark an active user as deleted at `at`
    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DomainError>;
}

/// Repository for Attendance entities
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert the check-in for `(user_id, date)`.
    ///
    /// Never overwrites: an existing record yields `AlreadyCheckedIn`.
    async fn upsert_check_in(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_in: DateTime<Utc>,
        is_late: bool,
    ) -> Result<Attendance, DomainError>;

    /// Set the check-out on an open record.
    ///
    /// Fails with `NotCheckedIn` when there is no record,
    /// `CheckOutBeforeCheckIn` when `check_out` precedes the stored check-in and
    /// `AlreadyCheckedOut` when the record is already closed. Concurrent calls
    /// for the same key write at most once.
    async fn record_check_out(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_out: DateTime<Utc>,
    ) -> Result<Attendance, DomainError>;

    /// Records of one user within a calendar month, ordered by date
    async fn find_by_user_and_month(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Attendance>, DomainError>;

    /// All records, ordered by date then user
    async fn find_all(&self) -> Result<Vec<Attendance>, DomainError>;

    /// The record for `(user_id, date)`, if any
    async fn find_one(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError>;

    /// Replace the timestamps and late flag of existing records.
    ///
    /// All or nothing: when any record is missing (`NotFound`), misordered or
    /// the store fails, none of the batch is written.
    async fn correct_all(&self, records: &[Attendance]) -> Result<Vec<Attendance>, DomainError>;
}
