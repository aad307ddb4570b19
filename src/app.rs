use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/heatmap", get(handlers::year_heatmap))
        .route("/api/cache/clear", post(handlers::clear_cache))
        .with_state(state)
}
