//! Attendance domain entity
//!
//! One record per user per calendar day. The record is created by the first
//! check-in of the day and completed in place by the check-out.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;
use crate::error::DomainError;

/// A user's attendance for one day, keyed by `(user_id, date)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    /// Fixed at check-in time from the configured cutoff
    pub is_late: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a (user, date) key sits in the check-in/check-out workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    /// No record for the day
    Absent,
    /// Checked in, not yet checked out
    CheckedIn,
    /// Both timestamps set; terminal for the day
    Closed,
}

impl std::fmt::Display for AttendanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceState::Absent => write!(f, "absent"),
            AttendanceState::CheckedIn => write!(f, "checked_in"),
            AttendanceState::Closed => write!(f, "closed"),
        }
    }
}

impl AttendanceState {
    pub fn of(record: Option<&Attendance>) -> Self {
        record.map_or(AttendanceState::Absent, Attendance::state)
    }
}

impl Attendance {
    pub fn state(&self) -> AttendanceState {
        if self.check_out.is_some() {
            AttendanceState::Closed
        } else {
            AttendanceState::CheckedIn
        }
    }

    /// Time between check-in and check-out, once the day is closed
    pub fn worked_duration(&self) -> Option<Duration> {
        self.check_out.map(|out| out - self.check_in)
    }
}

/// Check-out must not precede check-in
pub fn validate_ordering(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<(), DomainError> {
    if check_out < check_in {
        return Err(DomainError::CheckOutBeforeCheckIn(format!(
            "check-out {} is earlier than check-in {}",
            check_out.to_rfc3339(),
            check_in.to_rfc3339()
        )));
    }
    Ok(())
}

/// A check-in strictly after the cutoff is late; exactly at the cutoff is on time
pub fn is_late(check_in: NaiveTime, cutoff: NaiveTime) -> bool {
    check_in > cutoff
}

/// Lateness cutoff together with the offset that defines the local working day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    pub cutoff: NaiveTime,
    pub offset: FixedOffset,
}

impl AttendancePolicy {
    pub fn new(cutoff: NaiveTime, offset: FixedOffset) -> Self {
        Self { cutoff, offset }
    }

    /// Calendar date of `at` in the local working day
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn is_late(&self, at: DateTime<Utc>) -> bool {
        is_late(at.with_timezone(&self.offset).time(), self.cutoff)
    }

    /// Whether `at` lies within `date` in local time
    pub fn falls_on(&self, at: DateTime<Utc>, date: NaiveDate) -> bool {
        self.local_date(at) == date
    }
}

/// A validated calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DomainError::Validation(format!(
                "invalid month {}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Aggregated attendance for one user and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub days_present: u32,
    pub late_days: u32,
    pub closed_days: u32,
    pub worked_minutes: i64,
}

impl MonthlySummary {
    pub fn from_records(month: YearMonth, records: &[Attendance]) -> Self {
        let mut summary = MonthlySummary {
            year: month.year,
            month: month.month,
            days_present: 0,
            late_days: 0,
            closed_days: 0,
            worked_minutes: 0,
        };

        for record in records.iter().filter(|r| month.contains(r.date)) {
            summary.days_present += 1;
            if record.is_late {
                summary.late_days += 1;
            }
            if let Some(worked) = record.worked_duration() {
                summary.closed_days += 1;
                summary.worked_minutes += worked.num_minutes();
            }
        }

        summary
    }
}

/// Administrative correction of one day's timestamps
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceCorrection {
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
}
