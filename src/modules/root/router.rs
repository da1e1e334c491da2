use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::greeting;

pub fn init_root_router() -> Router<AppState> {
    Router::new().route("/", get(greeting))
}
