use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_ledger;

pub fn init_ledger_router() -> Router<AppState> {
    Router::new().route("/", get(get_ledger))
}
