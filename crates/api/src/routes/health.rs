//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, metrics, HealthStatus};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check with in-process metrics.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    if state.store.is_healthy() {
        health().store.set_healthy();
    } else {
        health().store.set_unhealthy("store reported unhealthy");
    }
    let report = health().report();

    Json(HealthResponse {
        status: match report.status {
            HealthStatus::Healthy => "healthy".to_string(),
            HealthStatus::Unhealthy => "unhealthy".to_string(),
        },
        report,
        metrics: metrics().snapshot(),
    })
}

/// GET /health/ready - Readiness probe (can accept traffic).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
