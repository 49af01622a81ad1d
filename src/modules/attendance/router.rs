use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_monthly, get_summary, record_attendance};

/// Routes: POST /, GET /summary, GET /monthly
pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_attendance))
        .route("/summary", get(get_summary))
        .route("/monthly", get(get_monthly))
}
