//! Mock implementations of port traits
//!
//! In-memory implementations with the same observable contract as the SQL
//! adapters. Each check-and-write happens under one write lock, which gives
//! the per-key serialization the database gets from its constraints.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{validate_ordering, Attendance, User, UserId, YearMonth};
use crate::domain::ports::{AttendanceRepository, UserRepository};
use crate::error::DomainError;

fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id.clone(), user);
        self
    }
}

/// Whether another stored user already holds `user`'s auth id or email
fn clashes(users: &HashMap<UserId, User>, user: &User) -> bool {
    users
        .values()
        .any(|u| u.id != user.id && (u.auth_id == user.auth_id || u.email == user.email))
}

fn duplicate(user: &User) -> DomainError {
    DomainError::DuplicateKey(format!(
        "auth_id '{}' or email '{}' is already in use",
        user.auth_id, user.email
    ))
}

fn user_not_found(id: &UserId) -> DomainError {
    DomainError::NotFound(format!("User {} not found", id))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.id) || clashes(&users, user) {
            return Err(duplicate(user));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        if !users.get(&user.id).is_some_and(User::is_active) {
            return Err(user_not_found(&user.id));
        }
        if clashes(&users, user) {
            return Err(duplicate(user));
        }
        if let Some(stored) = users.get_mut(&user.id) {
            stored.auth_id = user.auth_id.clone();
            stored.name = user.name.clone();
            stored.email = user.email.clone();
            stored.role = user.role.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, DomainError> {
        let users = self.users.read().unwrap();
        users
            .get(id)
            .filter(|u| u.is_active())
            .cloned()
            .ok_or_else(|| user_not_found(id))
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().unwrap();
        let mut result: Vec<User> = users
            .values()
            .filter(|u| include_deleted || u.is_active())
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        match users.get_mut(id).filter(|u| u.is_active()) {
            Some(user) => {
                user.deleted_at = Some(at);
                user.updated_at = at;
                Ok(())
            }
            None => Err(user_not_found(id)),
        }
    }
}

// ============================================================================
// In-Memory Attendance Repository
// ============================================================================

type AttendanceKey = (UserId, NaiveDate);

/// Clones share the same store
#[derive(Clone, Default)]
pub struct InMemoryAttendanceRepository {
    records: Arc<RwLock<HashMap<AttendanceKey, Attendance>>>,
    month_reads: Arc<AtomicUsize>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a record for testing
    pub fn with_record(self, record: Attendance) -> Self {
        self.records
            .write()
            .unwrap()
            .insert((record.user_id.clone(), record.date), record);
        self
    }

    /// Number of monthly queries served so far
    pub fn month_reads(&self) -> usize {
        self.month_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn upsert_check_in(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_in: DateTime<Utc>,
        is_late: bool,
    ) -> Result<Attendance, DomainError> {
        let mut records = self.records.write().unwrap();
        let key = (user_id.clone(), date);
        if records.contains_key(&key) {
            return Err(DomainError::AlreadyCheckedIn(format!(
                "User {} already checked in on {}",
                user_id, date
            )));
        }

        let now = current_time();
        let record = Attendance {
            user_id: user_id.clone(),
            date,
            check_in,
            check_out: None,
            is_late,
            created_at: now,
            updated_at: now,
        };
        records.insert(key, record.clone());
        Ok(record)
    }

    async fn record_check_out(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_out: DateTime<Utc>,
    ) -> Result<Attendance, DomainError> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(&(user_id.clone(), date)).ok_or_else(|| {
            DomainError::NotCheckedIn(format!("User {} has not checked in on {}", user_id, date))
        })?;

        if record.check_out.is_some() {
            return Err(DomainError::AlreadyCheckedOut(format!(
                "User {} already checked out on {}",
                user_id, date
            )));
        }
        validate_ordering(record.check_in, check_out)?;

        record.check_out = Some(check_out);
        record.updated_at = current_time();
        Ok(record.clone())
    }

    async fn find_by_user_and_month(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Attendance>, DomainError> {
        let month = YearMonth::new(year, month)?;
        self.month_reads.fetch_add(1, Ordering::SeqCst);
        let records = self.records.read().unwrap();
        let mut result: Vec<Attendance> = records
            .values()
            .filter(|r| &r.user_id == user_id && month.contains(r.date))
            .cloned()
            .collect();
        result.sort_by_key(|r| r.date);
        Ok(result)
    }

    async fn find_all(&self) -> Result<Vec<Attendance>, DomainError> {
        let records = self.records.read().unwrap();
        let mut result: Vec<Attendance> = records.values().cloned().collect();
        result.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(result)
    }

    async fn find_one(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError> {
        let records = self.records.read().unwrap();
        Ok(records.get(&(user_id.clone(), date)).cloned())
    }

    async fn correct_all(&self, records: &[Attendance]) -> Result<Vec<Attendance>, DomainError> {
        let mut stored = self.records.write().unwrap();

        for record in records {
            if let Some(check_out) = record.check_out {
                validate_ordering(record.check_in, check_out)?;
            }
            if !stored.contains_key(&(record.user_id.clone(), record.date)) {
                return Err(DomainError::NotFound(format!(
                    "No attendance for user {} on {}",
                    record.user_id, record.date
                )));
            }
        }

        let now = current_time();
        let mut corrected = Vec::with_capacity(records.len());
        for record in records {
            if let Some(entry) = stored.get_mut(&(record.user_id.clone(), record.date)) {
                entry.check_in = record.check_in;
                entry.check_out = record.check_out;
                entry.is_late = record.is_late;
                entry.updated_at = now;
                corrected.push(entry.clone());
            }
        }
        Ok(corrected)
    }
}

// ============================================================================
// Failing repositories
// ============================================================================

/// Every call fails as if the database were unreachable
#[derive(Default)]
pub struct FailingUserRepository;

fn unavailable() -> DomainError {
    DomainError::Database("connection refused (os error 111)".to_string())
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn create(&self, _user: &User) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn update(&self, _user: &User) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<User, DomainError> {
        Err(unavailable())
    }

    async fn find_all(&self, _include_deleted: bool) -> Result<Vec<User>, DomainError> {
        Err(unavailable())
    }

    async fn soft_delete(&self, _id: &UserId, _at: DateTime<Utc>) -> Result<(), DomainError> {
        Err(unavailable())
    }
}

/// Reads from an in-memory store; every write fails as if the database
/// dropped the connection
pub struct ReadOnlyAttendanceRepository {
    inner: InMemoryAttendanceRepository,
}

impl ReadOnlyAttendanceRepository {
    pub fn new(inner: InMemoryAttendanceRepository) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AttendanceRepository for ReadOnlyAttendanceRepository {
    async fn upsert_check_in(
        &self,
        _user_id: &UserId,
        _date: NaiveDate,
        _check_in: DateTime<Utc>,
        _is_late: bool,
    ) -> Result<Attendance, DomainError> {
        Err(unavailable())
    }

    async fn record_check_out(
        &self,
        _user_id: &UserId,
        _date: NaiveDate,
        _check_out: DateTime<Utc>,
    ) -> Result<Attendance, DomainError> {
        Err(unavailable())
    }

    async fn find_by_user_and_month(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Attendance>, DomainError> {
        self.inner.find_by_user_and_month(user_id, year, month).await
    }

    async fn find_all(&self) -> Result<Vec<Attendance>, DomainError> {
        self.inner.find_all().await
    }

    async fn find_one(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError> {
        self.inner.find_one(user_id, date).await
    }

    async fn correct_all(&self, _records: &[Attendance]) -> Result<Vec<Attendance>, DomainError> {
        Err(unavailable())
    }
}
