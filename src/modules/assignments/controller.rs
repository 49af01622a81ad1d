use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use eraport_core::AppError;
use eraport_models::ids::{ClassId, TeacherId};

use crate::modules::assignments::model::{
    TeacherClassesResponse, TeacherLoadQuery, TeacherSubjectsResponse,
};
use crate::modules::assignments::service::AssignmentService;
use crate::state::AppState;
use crate::validator::ValidatedQuery;

/// Classes a teacher is assigned to in a period
#[utoipa::path(
    get,
    path = "/api/teachers/{teacher_id}/classes",
    summary = "Teacher classes",
    params(
        ("teacher_id" = Uuid, Path, description = "Teacher ID"),
        TeacherLoadQuery
    ),
    responses(
        (status = 200, description = "Distinct active classes sorted by name", body = TeacherClassesResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_classes(
    State(state): State<AppState>,
    Path(teacher_id): Path<Uuid>,
    ValidatedQuery(query): ValidatedQuery<TeacherLoadQuery>,
) -> Result<Json<TeacherClassesResponse>, AppError> {
    let teacher_id = TeacherId::from(teacher_id);
    let classes = AssignmentService::resolve_classes_for_teacher(
        state.store.as_ref(),
        teacher_id,
        query.period_id,
    )
    .await?;

    Ok(Json(TeacherClassesResponse {
        teacher_id,
        period_id: query.period_id,
        classes,
    }))
}

/// Subjects a teacher teaches in one class during a period
#[utoipa::path(
    get,
    path = "/api/teachers/{teacher_id}/classes/{class_id}/subjects",
    summary = "Teacher subjects in class",
    params(
        ("teacher_id" = Uuid, Path, description = "Teacher ID"),
        ("class_id" = Uuid, Path, description = "Class ID"),
        TeacherLoadQuery
    ),
    responses(
        (status = 200, description = "Distinct raw subject names sorted lexically", body = TeacherSubjectsResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_subjects(
    State(state): State<AppState>,
    Path((teacher_id, class_id)): Path<(Uuid, Uuid)>,
    ValidatedQuery(query): ValidatedQuery<TeacherLoadQuery>,
) -> Result<Json<TeacherSubjectsResponse>, AppError> {
    let teacher_id = TeacherId::from(teacher_id);
    let class_id = ClassId::from(class_id);
    let subjects = AssignmentService::resolve_subjects_for_teacher_and_class(
        state.store.as_ref(),
        teacher_id,
        class_id,
        query.period_id,
    )
    .await?;

    Ok(Json(TeacherSubjectsResponse {
        teacher_id,
        class_id,
        period_id: query.period_id,
        subjects,
    }))
}
