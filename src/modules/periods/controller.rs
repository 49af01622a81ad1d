use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use eraport_core::AppError;
use eraport_models::ids::AcademicPeriodId;

use crate::modules::periods::model::{AcademicPeriod, CreatePeriodDto, PeriodValidation};
use crate::modules::periods::service::PeriodService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List every academic period
#[utoipa::path(
    get,
    path = "/api/periods",
    summary = "List periods",
    responses(
        (status = 200, description = "All periods ordered by year and semester", body = Vec<AcademicPeriod>)
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn list_periods(
    State(state): State<AppState>,
) -> Result<Json<Vec<AcademicPeriod>>, AppError> {
    let periods = PeriodService::list_periods(state.store.as_ref()).await?;
    Ok(Json(periods))
}

/// Open a new semester (created inactive)
#[utoipa::path(
    post,
    path = "/api/periods",
    summary = "Create period",
    request_body = CreatePeriodDto,
    responses(
        (status = 201, description = "Period created", body = AcademicPeriod),
        (status = 400, description = "Invalid body or start date not before end date"),
        (status = 409, description = "Semester already exists for that year"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn create_period(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreatePeriodDto>,
) -> Result<(StatusCode, Json<AcademicPeriod>), AppError> {
    let period = PeriodService::create_period(state.store.as_ref(), &state.periods, dto).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Get the active period
#[utoipa::path(
    get,
    path = "/api/periods/active",
    summary = "Active period",
    responses(
        (status = 200, description = "The single active period", body = AcademicPeriod),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn get_active_period(
    State(state): State<AppState>,
) -> Result<Json<AcademicPeriod>, AppError> {
    let context =
        PeriodService::context(state.store.as_ref(), &state.periods, state.clock.as_ref()).await?;
    Ok(Json(context.active))
}

/// List the periods of the active academic year
#[utoipa::path(
    get,
    path = "/api/periods/active-year",
    summary = "Periods in active year",
    responses(
        (status = 200, description = "Periods of the active year, semester ascending", body = Vec<AcademicPeriod>),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn list_active_year(
    State(state): State<AppState>,
) -> Result<Json<Vec<AcademicPeriod>>, AppError> {
    let context =
        PeriodService::context(state.store.as_ref(), &state.periods, state.clock.as_ref()).await?;
    Ok(Json(context.year_periods))
}

/// Suggest the default semester for pickers
#[utoipa::path(
    get,
    path = "/api/periods/suggested",
    summary = "Suggested period",
    responses(
        (status = 200, description = "Period containing today's school date, else the active period", body = AcademicPeriod),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn get_suggested_period(
    State(state): State<AppState>,
) -> Result<Json<AcademicPeriod>, AppError> {
    let period = PeriodService::suggest_period(
        state.store.as_ref(),
        &state.periods,
        state.clock.as_ref(),
        state.school_config.utc_offset(),
    )
    .await?;
    Ok(Json(period))
}

/// Check whether a period accepts new grade or attendance data
#[utoipa::path(
    get,
    path = "/api/periods/{id}/validate",
    summary = "Validate period for input",
    params(
        ("id" = Uuid, Path, description = "Academic period ID")
    ),
    responses(
        (status = 200, description = "Validation outcome; rejections carry a reason", body = PeriodValidation),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn validate_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PeriodValidation>, AppError> {
    let validation = PeriodService::validate_for_input(
        state.store.as_ref(),
        &state.periods,
        state.clock.as_ref(),
        AcademicPeriodId::from(id),
    )
    .await?;
    Ok(Json(validation))
}

/// Make a period the single active one
#[utoipa::path(
    post,
    path = "/api/periods/{id}/activate",
    summary = "Activate period",
    params(
        ("id" = Uuid, Path, description = "Academic period ID")
    ),
    responses(
        (status = 200, description = "Period activated", body = AcademicPeriod),
        (status = 404, description = "Period not found")
    ),
    tag = "Periods"
)]
#[instrument(skip(state))]
pub async fn activate_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcademicPeriod>, AppError> {
    let period = PeriodService::activate_period(
        state.store.as_ref(),
        &state.periods,
        AcademicPeriodId::from(id),
    )
    .await?;
    Ok(Json(period))
}
