//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, SubsecRound, TimeZone, Utc};

use crate::domain::entities::{AttendancePolicy, NewUser, User, UserId};

/// Create an active test user whose timestamps lie an hour in the past
pub fn test_user(name: &str) -> User {
    let created = (Utc::now() - Duration::hours(1)).trunc_subsecs(6);
    User {
        id: UserId::new(),
        auth_id: format!("auth|{}", name),
        name: name.to_string(),
        email: format!("{}@example.com", name),
        role: "employee".to_string(),
        created_at: created,
        updated_at: created,
        deleted_at: None,
    }
}

/// Create-user input matching `test_user(name)`
pub fn new_user(name: &str) -> NewUser {
    NewUser {
        auth_id: format!("auth|{}", name),
        name: name.to_string(),
        email: format!("{}@example.com", name),
        role: "employee".to_string(),
    }
}

/// 09:00 cutoff in UTC
pub fn test_policy() -> AttendancePolicy {
    AttendancePolicy::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), Utc.fix())
}

pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, d).unwrap()
}

pub fn at(year: i32, month: u32, d: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, hour, minute, 0).unwrap()
}
