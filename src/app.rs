use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/data.json", get(handlers::get_dataset))
        .route("/api/variations", get(handlers::get_variations))
        .route("/api/chart", get(handlers::get_chart))
        .route("/api/summary", get(handlers::get_summary))
        .with_state(state)
}
