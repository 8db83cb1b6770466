//! Attendance handlers
//!
//! Check-in/check-out and the monthly views of a user's attendance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::app::now;
use crate::domain::entities::{
    Attendance, AttendanceCorrection, AttendancePolicy, AttendanceState, MonthlySummary, UserId,
    YearMonth,
};
use crate::error::AppError;
use crate::AppState;

/// Body of a check-in or check-out.
///
/// `at` defaults to the server clock and `date` to the local date of `at`.
/// An overnight check-out must name the date it closes.
#[derive(Debug, Default, Deserialize)]
pub struct CheckpointRequest {
    pub date: Option<NaiveDate>,
    pub at: Option<DateTime<Utc>>,
}

impl CheckpointRequest {
    fn resolve(self, policy: &AttendancePolicy) -> (NaiveDate, DateTime<Utc>) {
        let at = self.at.unwrap_or_else(now);
        let date = self.date.unwrap_or_else(|| policy.local_date(at));
        (date, at)
    }
}

/// Attendance record as returned over HTTP
#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub user_id: String,
    pub date: NaiveDate,
    pub check_in: String,
    pub check_out: Option<String>,
    pub is_late: bool,
    pub state: AttendanceState,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Attendance> for AttendanceResponse {
    fn from(record: Attendance) -> Self {
        Self {
            state: record.state(),
            user_id: record.user_id.0,
            date: record.date,
            check_in: record.check_in.to_rfc3339(),
            check_out: record.check_out.map(|dt| dt.to_rfc3339()),
            is_late: record.is_late,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// A month of records with its aggregate
#[derive(Debug, Serialize)]
pub struct MonthlyAttendanceResponse {
    pub records: Vec<AttendanceResponse>,
    pub summary: MonthlySummary,
}

#[derive(Debug, Deserialize)]
pub struct CorrectionsRequest {
    pub corrections: Vec<AttendanceCorrection>,
}

fn to_responses(records: Vec<Attendance>) -> Vec<AttendanceResponse> {
    records.into_iter().map(AttendanceResponse::from).collect()
}

/// POST /users/:id/attendance/check-in
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CheckpointRequest>,
) -> Result<(StatusCode, Json<AttendanceResponse>), AppError> {
    let (date, at) = request.resolve(state.attendance_service.policy());

    let record = state
        .attendance_service
        .check_in(&UserId(id), date, at)
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// POST /users/:id/attendance/check-out
pub async fn check_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CheckpointRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    let (date, at) = request.resolve(state.attendance_service.policy());

    let record = state
        .attendance_service
        .check_out(&UserId(id), date, at)
        .await?;

    Ok(Json(record.into()))
}

/// GET /users/:id/attendance/:year/:month
pub async fn get_monthly_attendance(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<MonthlyAttendanceResponse>, AppError> {
    let records = state
        .attendance_service
        .get_monthly_attendance(&UserId(id), year, month)
        .await?;
    // Summarize the same read so both halves agree
    let summary = MonthlySummary::from_records(YearMonth::new(year, month)?, &records);

    Ok(Json(MonthlyAttendanceResponse {
        records: to_responses(records),
        summary,
    }))
}

/// GET /users/:id/attendance/:year/:month/summary
pub async fn get_monthly_summary(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<MonthlySummary>, AppError> {
    let summary = state
        .attendance_service
        .get_monthly_summary(&UserId(id), year, month)
        .await?;

    Ok(Json(summary))
}

/// PUT /users/:id/attendance/:year/:month
///
/// Administrative correction of existing days.
pub async fn update_monthly_attendance(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(String, i32, u32)>,
    Json(request): Json<CorrectionsRequest>,
) -> Result<Json<Vec<AttendanceResponse>>, AppError> {
    if request.corrections.is_empty() {
        return Err(AppError::BadRequest(
            "at least one correction is required".to_string(),
        ));
    }

    let records = state
        .attendance_service
        .update_monthly_attendance(&UserId(id), year, month, request.corrections)
        .await?;

    Ok(Json(to_responses(records)))
}

/// GET /attendance
pub async fn list_attendance(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceResponse>>, AppError> {
    let records = state.attendance_service.list_all_attendance().await?;
    Ok(Json(to_responses(records)))
}
