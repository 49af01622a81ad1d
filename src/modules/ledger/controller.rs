use axum::{Json, extract::State};
use tracing::instrument;

use eraport_core::AppError;

use crate::modules::ledger::model::{LedgerQuery, LedgerReport};
use crate::modules::ledger::service::LedgerService;
use crate::state::AppState;
use crate::validator::ValidatedQuery;

/// Ranked grade ledger of a class
#[utoipa::path(
    get,
    path = "/api/ledger",
    summary = "Grade ledger",
    params(LedgerQuery),
    responses(
        (status = 200, description = "Rows with a positive sum, sum descending, top three ranked", body = LedgerReport),
        (status = 400, description = "Missing or malformed query parameters")
    ),
    tag = "Ledger"
)]
#[instrument(skip(state))]
pub async fn get_ledger(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LedgerQuery>,
) -> Result<Json<LedgerReport>, AppError> {
    let ledger =
        LedgerService::build_ledger(state.store.as_ref(), query.class_id, query.period_id).await?;
    Ok(Json(ledger))
}
