use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::run_query;

pub fn init_query_router() -> Router<AppState> {
    Router::new().route("/query", post(run_query))
}
