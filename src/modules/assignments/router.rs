use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_teacher_classes, get_teacher_subjects};

/// Routes: GET /{teacher_id}/classes, GET /{teacher_id}/classes/{class_id}/subjects
pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/{teacher_id}/classes", get(get_teacher_classes))
        .route(
            "/{teacher_id}/classes/{class_id}/subjects",
            get(get_teacher_subjects),
        )
}
