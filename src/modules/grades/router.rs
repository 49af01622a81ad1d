use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{clean_duplicates, get_completion, save_grade};

/// Routes: POST /, GET /completion, POST /clean-duplicates
pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/", post(save_grade))
        .route("/completion", get(get_completion))
        .route("/clean-duplicates", post(clean_duplicates))
}
