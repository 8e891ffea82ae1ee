//! Tests for health check endpoints.

use axum::http::StatusCode;
use integration_tests::setup::TestContext;

/// /health reports status, components and metrics.
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["report"]["components"][0]["name"], "store");
    assert!(body["metrics"].get("events_stored").is_some());
    assert!(body["metrics"].get("queue_depth").is_some());
}

/// Liveness is unconditional.
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/health/live").await.assert_status(StatusCode::OK);
}

/// Readiness follows the store component once /health has refreshed it.
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server.get("/health").await.assert_status_ok();
    server.get("/health/ready").await.assert_status(StatusCode::OK);
}
