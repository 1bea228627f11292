use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod metrics;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics::get_metrics))
        .route("/", get(health::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
