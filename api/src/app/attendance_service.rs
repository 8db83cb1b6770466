//! Attendance service
//!
//! Drives the per-day state machine `Absent -> CheckedIn -> Closed`.
//! Lateness is decided here from the configured policy and handed to the
//! repository; the repository only guards the key and the row ordering.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::{
    validate_ordering, Attendance, AttendanceCorrection, AttendancePolicy, AttendanceState,
    MonthlySummary, UserId, YearMonth,
};
use crate::domain::ports::{AttendanceRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Service for the check-in/check-out workflow and monthly reporting
pub struct AttendanceService<AR, UR>
where
    AR: AttendanceRepository + ?Sized,
    UR: UserRepository + ?Sized,
{
    attendance: Arc<AR>,
    users: Arc<UR>,
    policy: AttendancePolicy,
}

impl<AR, UR> AttendanceService<AR, UR>
where
    AR: AttendanceRepository + ?Sized,
    UR: UserRepository + ?Sized,
{
    pub fn new(attendance: Arc<AR>, users: Arc<UR>, policy: AttendancePolicy) -> Self {
        Self {
            attendance,
            users,
            policy,
        }
    }

    pub fn policy(&self) -> &AttendancePolicy {
        &self.policy
    }

    /// Record the first check-in of `date` for an active user.
    ///
    /// `at` must fall on `date` in local time. A second check-in on the same
    /// date fails with `AlreadyCheckedIn` and leaves the stored one untouched.
    pub async fn check_in(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<Attendance, AppError> {
        // Only active users may check in
        self.users.find_by_id(user_id).await?;

        self.ensure_on_date(at, date)?;
        let is_late = self.policy.is_late(at);

        let record = self
            .attendance
            .upsert_check_in(user_id, date, at, is_late)
            .await?;

        tracing::info!(
            user_id = %user_id,
            date = %date,
            is_late,
            "Checked in"
        );

        Ok(record)
    }

    /// Close the day for `user_id`
    pub async fn check_out(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<Attendance, AppError> {
        let existing = self.attendance.find_one(user_id, date).await?;

        match AttendanceState::of(existing.as_ref()) {
            AttendanceState::Absent => {
                return Err(DomainError::NotCheckedIn(format!(
                    "User {} has not checked in on {}",
                    user_id, date
                ))
                .into());
            }
            AttendanceState::Closed => {
                return Err(DomainError::AlreadyCheckedOut(format!(
                    "User {} already checked out on {}",
                    user_id, date
                ))
                .into());
            }
            AttendanceState::CheckedIn => {}
        }

        if let Some(record) = &existing {
            validate_ordering(record.check_in, at)?;
        }

        // The repository re-checks both conditions atomically
        let record = self.attendance.record_check_out(user_id, date, at).await?;

        tracing::info!(user_id = %user_id, date = %date, "Checked out");

        Ok(record)
    }

    /// Records of one month ordered by date; empty when the user has none
    pub async fn get_monthly_attendance(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Attendance>, AppError> {
        let month = YearMonth::new(year, month)?;

        Ok(self
            .attendance
            .find_by_user_and_month(user_id, month.year, month.month)
            .await?)
    }

    pub async fn get_monthly_summary(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<MonthlySummary, AppError> {
        let records = self.get_monthly_attendance(user_id, year, month).await?;
        let month = YearMonth::new(year, month)?;

        Ok(MonthlySummary::from_records(month, &records))
    }

    pub async fn list_all_attendance(&self) -> Result<Vec<Attendance>, AppError> {
        Ok(self.attendance.find_all().await?)
    }

    /// Apply administrative corrections to existing records of one month.
    ///
    /// Every correction is validated, and its record looked up, before the
    /// batch is written in one step. Lateness is recomputed from the corrected
    /// check-in. A correction without `check_out` keeps the stored check-out.
    pub async fn update_monthly_attendance(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
        corrections: Vec<AttendanceCorrection>,
    ) -> Result<Vec<Attendance>, AppError> {
        let month = YearMonth::new(year, month)?;

        let mut seen = HashSet::new();
        for correction in &corrections {
            if !month.contains(correction.date) {
                return Err(DomainError::Validation(format!(
                    "date {} is outside {}",
                    correction.date, month
                ))
                .into());
            }
            if !seen.insert(correction.date) {
                return Err(DomainError::Validation(format!(
                    "date {} is corrected more than once",
                    correction.date
                ))
                .into());
            }
            self.ensure_on_date(correction.check_in, correction.date)?;
            if let Some(check_out) = correction.check_out {
                validate_ordering(correction.check_in, check_out)?;
            }
        }

        let mut pending = Vec::with_capacity(corrections.len());
        for correction in corrections {
            let mut record = self
                .attendance
                .find_one(user_id, correction.date)
                .await?
                .ok_or_else(|| {
                    DomainError::NotFound(format!(
                        "No attendance for user {} on {}",
                        user_id, correction.date
                    ))
                })?;

            // An omitted check-out keeps the stored one
            let check_out = correction.check_out.or(record.check_out);
            if let Some(check_out) = check_out {
                validate_ordering(correction.check_in, check_out)?;
            }

            record.is_late = self.policy.is_late(correction.check_in);
            record.check_in = correction.check_in;
            record.check_out = check_out;
            pending.push(record);
        }

        let mut corrected = self.attendance.correct_all(&pending).await?;
        corrected.sort_by_key(|r| r.date);

        tracing::info!(
            user_id = %user_id,
            month = %month,
            count = corrected.len(),
            "Corrected attendance"
        );

        Ok(corrected)
    }

    fn ensure_on_date(&self, at: DateTime<Utc>, date: NaiveDate) -> Result<(), DomainError> {
        if !self.policy.falls_on(at, date) {
            return Err(DomainError::Validation(format!(
                "{} does not fall on {}",
                at.to_rfc3339(),
                date
            )));
        }
        Ok(())
    }
}
