//! API routes.

pub mod health;
pub mod panels;
pub mod track;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/track", post(track::track_handler))
        .route("/api/analytics/metric", post(panels::metric_handler))
        .route("/api/analytics/bar", post(panels::bar_handler))
        .route("/api/analytics/trend", post(panels::trend_handler))
        .route("/api/analytics/funnel", post(panels::funnel_handler))
        .route("/api/analytics/overview", get(panels::overview_handler))
        .route("/api/analytics/sessions", get(panels::sessions_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
