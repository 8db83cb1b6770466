//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod attendance;
pub mod users;

pub use attendance::{
    check_in, check_out, get_monthly_attendance, get_monthly_summary, list_attendance,
    update_monthly_attendance,
};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
