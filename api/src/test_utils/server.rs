//! Router-level test harness
//!
//! Serves the real router, with the real services, over the given
//! repositories.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;

use super::{test_policy, InMemoryAttendanceRepository};
use crate::app::{AttendanceService, UserService};
use crate::domain::ports::{AttendanceRepository, UserRepository};
use crate::{router, AppState};

pub fn test_state<UR, AR>(users: UR, attendance: AR) -> AppState
where
    UR: UserRepository + 'static,
    AR: AttendanceRepository + 'static,
{
    let users: Arc<dyn UserRepository> = Arc::new(users);
    let attendance: Arc<dyn AttendanceRepository> = Arc::new(attendance);

    AppState {
        user_service: Arc::new(UserService::new(users.clone())),
        attendance_service: Arc::new(AttendanceService::new(attendance, users, test_policy())),
    }
}

/// Server over `users` and an empty attendance store
pub fn test_server<UR>(users: UR) -> TestServer
where
    UR: UserRepository + 'static,
{
    test_server_with(users, InMemoryAttendanceRepository::new())
}

pub fn test_server_with<UR, AR>(users: UR, attendance: AR) -> TestServer
where
    UR: UserRepository + 'static,
    AR: AttendanceRepository + 'static,
{
    let app = router(test_state(users, attendance), Duration::from_secs(5));
    TestServer::new(app).expect("failed to start test server")
}
