use anyhow::anyhow;
use axum::{
    Json,
    extract::State,
};
use tracing::instrument;

use eraport_core::AppError;

use crate::modules::grades::model::{
    CleanDuplicatesDto, CleanupReport, CompletionQuery, CompletionReport,
    GradeRecordWithObjectives, SaveGradeDto,
};
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

/// Per-subject fill status for a class
#[utoipa::path(
    get,
    path = "/api/grades/completion",
    summary = "Grade completion",
    params(CompletionQuery),
    responses(
        (status = 200, description = "Completion rows in curriculum order; failed subjects listed under failures", body = CompletionReport),
        (status = 400, description = "Missing or malformed query parameters")
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn get_completion(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<CompletionQuery>,
) -> Result<Json<CompletionReport>, AppError> {
    let report = match query.teacher_id {
        Some(teacher_id) => {
            GradeService::completion_for_teacher(
                state.store.as_ref(),
                teacher_id,
                query.class_id,
                query.period_id,
            )
            .await?
        }
        None => {
            GradeService::completion_for_class(
                state.store.as_ref(),
                query.class_id,
                query.period_id,
            )
            .await?
        }
    };

    Ok(Json(report))
}

/// Save one student's grade
#[utoipa::path(
    post,
    path = "/api/grades",
    summary = "Save grade",
    request_body = SaveGradeDto,
    responses(
        (status = 200, description = "Grade stored under its canonical subject", body = GradeRecordWithObjectives),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Period is not part of the active academic year"),
        (status = 422, description = "Validation failed"),
        (status = 503, description = "No active academic year configured")
    ),
    tag = "Grades"
)]
#[instrument(skip(state, dto))]
pub async fn save_grade(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SaveGradeDto>,
) -> Result<Json<GradeRecordWithObjectives>, AppError> {
    let saved = GradeService::save_grade(
        state.store.as_ref(),
        &state.periods,
        state.clock.as_ref(),
        dto,
    )
    .await?;
    Ok(Json(saved))
}

/// Remove duplicate grade records, keeping the most recently updated one
#[utoipa::path(
    post,
    path = "/api/grades/clean-duplicates",
    summary = "Clean duplicate grades",
    request_body = CleanDuplicatesDto,
    responses(
        (status = 200, description = "Duplicates removed", body = CleanupReport),
        (status = 400, description = "Confirmation missing")
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn clean_duplicates(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CleanDuplicatesDto>,
) -> Result<Json<CleanupReport>, AppError> {
    if !dto.confirm {
        return Err(AppError::bad_request(anyhow!(
            "Deleting duplicate grades is irreversible; resend with \"confirm\": true"
        )));
    }

    let report =
        GradeService::clean_duplicates(state.store.as_ref(), dto.class_id, dto.period_id).await?;
    Ok(Json(report))
}
