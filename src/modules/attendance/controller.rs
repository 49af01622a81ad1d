use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use eraport_core::AppError;

use crate::modules::attendance::model::{
    AttendanceRecord, AttendanceReport, MonthlyAttendanceReport, MonthlyQuery,
    RecordAttendanceDto, SummaryQuery,
};
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

/// Semester attendance summary for a class
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    summary = "Attendance summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Per-student counts and percentages; complete=false when a page failed", body = AttendanceReport),
        (status = 400, description = "Missing or malformed query parameters")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SummaryQuery>,
) -> Result<Json<AttendanceReport>, AppError> {
    let report = AttendanceService::summarize(
        state.store.as_ref(),
        state.store_config.attendance_page_size,
        query.period_id,
        query.class_id,
        query.subject.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

/// Attendance detail of one calendar month
#[utoipa::path(
    get,
    path = "/api/attendance/monthly",
    summary = "Monthly attendance",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Per-student counts with the status of every recorded day", body = MonthlyAttendanceReport),
        (status = 400, description = "Missing or malformed query parameters"),
        (status = 422, description = "Month or year out of range")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn get_monthly(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MonthlyQuery>,
) -> Result<Json<MonthlyAttendanceReport>, AppError> {
    let report = AttendanceService::detail_for_month(
        state.store.as_ref(),
        state.store_config.attendance_page_size,
        query.month,
        query.year,
        query.period_id,
        query.class_id,
        query.subject.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

/// Record a daily or lesson check-in
#[utoipa::path(
    post,
    path = "/api/attendance",
    summary = "Record attendance",
    request_body = RecordAttendanceDto,
    responses(
        (status = 201, description = "Check-in stored (overwrites the same student, date and subject)", body = AttendanceRecord),
        (status = 422, description = "Validation failed or date outside the active period"),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn record_attendance(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RecordAttendanceDto>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    let record = AttendanceService::record_attendance(
        state.store.as_ref(),
        &state.periods,
        state.clock.as_ref(),
        state.school_config.utc_offset(),
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}
