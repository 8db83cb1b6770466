//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and repository ports.

pub mod attendance_service;
pub mod user_service;

pub use attendance_service::AttendanceService;
pub use user_service::UserService;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the stores keep (microseconds)
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
