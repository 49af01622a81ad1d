use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_period, create_period, get_active_period, get_suggested_period, list_active_year,
    list_periods, validate_period,
};

/// Routes: GET /, POST /, GET /active, GET /active-year, GET /suggested,
/// GET /{id}/validate, POST /{id}/activate
pub fn init_periods_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_periods).post(create_period))
        .route("/active", get(get_active_period))
        .route("/active-year", get(list_active_year))
        .route("/suggested", get(get_suggested_period))
        .route("/{id}/validate", get(validate_period))
        .route("/{id}/activate", post(activate_period))
}
