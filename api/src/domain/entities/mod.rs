//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod attendance;
pub mod user;

pub use attendance::{
    validate_ordering, Attendance, AttendanceCorrection, AttendancePolicy, AttendanceState,
    MonthlySummary, YearMonth,
};
pub use user::{NewUser, User, UserChanges, UserId};
