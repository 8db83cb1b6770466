//! SQL adapter for AttendanceRepository
//!
//! Check-in relies on the `(user_id, date)` primary key to reject a second
//! insert. Check-out is a conditional update guarded by `check_out IS NULL`,
//! so of two racing check-outs only one touches the row. A correction batch
//! runs in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::entities::{validate_ordering, Attendance, UserId, YearMonth};
use crate::domain::ports::AttendanceRepository;
use crate::entity::attendance;
use crate::error::{classify_db_error, DomainError};

/// SeaORM implementation of AttendanceRepository
pub struct SqlAttendanceRepository {
    db: DatabaseConnection,
}

impl SqlAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<attendance::Model>, DomainError> {
        attendance::Entity::find()
            .filter(key(user_id, date))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Current time at the precision PostgreSQL stores
fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn key(user_id: &UserId, date: NaiveDate) -> Condition {
    Condition::all()
        .add(attendance::Column::UserId.eq(user_id.as_str()))
        .add(attendance::Column::Date.eq(date))
}

#[async_trait]
impl AttendanceRepository for SqlAttendanceRepository {
    async fn upsert_check_in(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_in: DateTime<Utc>,
        is_late: bool,
    ) -> Result<Attendance, DomainError> {
        let now = current_time();

        let model = attendance::ActiveModel {
            user_id: Set(user_id.0.clone()),
            date: Set(date),
            check_in: Set(check_in.fixed_offset()),
            check_out: Set(None),
            is_late: Set(is_late),
            created_at: Set(now.fixed_offset()),
            updated_at: Set(now.fixed_offset()),
        };

        attendance::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                classify_db_error(e, || {
                    DomainError::AlreadyCheckedIn(format!(
                        "User {} already checked in on {}",
                        user_id, date
                    ))
                })
            })?;

        Ok(Attendance {
            user_id: user_id.clone(),
            date,
            check_in,
            check_out: None,
            is_late,
            created_at: now,
            updated_at: now,
        })
    }

    async fn record_check_out(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        check_out: DateTime<Utc>,
    ) -> Result<Attendance, DomainError> {
        let already_closed = || {
            DomainError::AlreadyCheckedOut(format!(
                "User {} already checked out on {}",
                user_id, date
            ))
        };

        let existing = self.find_model(user_id, date).await?.ok_or_else(|| {
            DomainError::NotCheckedIn(format!("User {} has not checked in on {}", user_id, date))
        })?;

        if existing.check_out.is_some() {
            return Err(already_closed());
        }
        validate_ordering(existing.check_in.with_timezone(&Utc), check_out)?;

        let now = current_time();
        let result = attendance::Entity::update_many()
            .col_expr(
                attendance::Column::CheckOut,
                Expr::value(check_out.fixed_offset()),
            )
            .col_expr(attendance::Column::UpdatedAt, Expr::value(now.fixed_offset()))
            .filter(key(user_id, date))
            .filter(attendance::Column::CheckOut.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Lost the race to a concurrent check-out
        if result.rows_affected == 0 {
            return Err(already_closed());
        }

        let mut record: Attendance = existing.into();
        record.check_out = Some(check_out);
        record.updated_at = now;
        Ok(record)
    }

    async fn find_by_user_and_month(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Attendance>, DomainError> {
        let month = YearMonth::new(year, month)?;

        let results = attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(user_id.as_str()))
            .filter(attendance::Column::Date.between(month.first_day(), month.last_day()))
            .order_by_asc(attendance::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_all(&self) -> Result<Vec<Attendance>, DomainError> {
        let results = attendance::Entity::find()
            .order_by_asc(attendance::Column::Date)
            .order_by_asc(attendance::Column::UserId)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_one(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, DomainError> {
        Ok(self.find_model(user_id, date).await?.map(|m| m.into()))
    }

    async fn correct_all(&self, records: &[Attendance]) -> Result<Vec<Attendance>, DomainError> {
        for record in records {
            if let Some(check_out) = record.check_out {
                validate_ordering(record.check_in, check_out)?;
            }
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let now = current_time();
        let mut corrected = Vec::with_capacity(records.len());
        for record in records {
            let result = attendance::Entity::update_many()
                .col_expr(
                    attendance::Column::CheckIn,
                    Expr::value(record.check_in.fixed_offset()),
                )
                .col_expr(
                    attendance::Column::CheckOut,
                    Expr::value(record.check_out.map(|dt| dt.fixed_offset())),
                )
                .col_expr(attendance::Column::IsLate, Expr::value(record.is_late))
                .col_expr(attendance::Column::UpdatedAt, Expr::value(now.fixed_offset()))
                .filter(key(&record.user_id, record.date))
                .exec(&txn)
                .await
                .map_err(|e| DomainError::Database(e.to_string()))?;

            // Dropping the uncommitted transaction rolls back earlier rows
            if result.rows_affected == 0 {
                return Err(DomainError::NotFound(format!(
                    "No attendance for user {} on {}",
                    record.user_id, record.date
                )));
            }

            let mut record = record.clone();
            record.updated_at = now;
            corrected.push(record);
        }

        txn.commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(corrected)
    }
}

/// Convert SeaORM model to domain entity
impl From<attendance::Model> for Attendance {
    fn from(model: attendance::Model) -> Self {
        Attendance {
            user_id: UserId(model.user_id),
            date: model.date,
            check_in: model.check_in.with_timezone(&Utc),
            check_out: model.check_out.map(|dt| dt.with_timezone(&Utc)),
            is_late: model.is_late,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
