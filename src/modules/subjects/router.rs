use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{list_subjects, normalize_subject};

pub fn init_subjects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subjects))
        .route("/normalize", get(normalize_subject))
}
