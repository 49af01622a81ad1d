use axum::Json;
use tracing::instrument;

use eraport_core::AppError;

use crate::modules::subjects::model::{NormalizeQuery, NormalizedSubject, SubjectListResponse};
use crate::modules::subjects::service::SubjectService;
use crate::validator::ValidatedQuery;

#[utoipa::path(
    get,
    path = "/api/subjects/normalize",
    params(NormalizeQuery),
    responses(
        (status = 200, description = "Canonical subject name", body = NormalizedSubject),
        (status = 400, description = "Missing name")
    ),
    tag = "Subjects"
)]
#[instrument]
pub async fn normalize_subject(
    ValidatedQuery(query): ValidatedQuery<NormalizeQuery>,
) -> Result<Json<NormalizedSubject>, AppError> {
    Ok(Json(SubjectService::describe(&query.name)))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "Canonical subjects in curriculum order", body = SubjectListResponse)
    ),
    tag = "Subjects"
)]
#[instrument]
pub async fn list_subjects() -> Json<SubjectListResponse> {
    Json(SubjectService::list())
}
