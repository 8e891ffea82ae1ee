//! End-to-end tests for the ingest endpoint.
//!
//! POST /api/track → transform and validate → MemoryStore (through MockStore)

use axum_test::TestServer;
use event_store::{EventFilter, EventStore};
use integration_tests::{fixtures, setup::TestContext};
use serde_json::json;

/// Valid batch is stored and acknowledged with its count.
#[tokio::test]
async fn test_track_stores_events() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/track")
        .json(&fixtures::track_payload(fixtures::views(5, 2)))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 5);
    assert!(body["timestamp"].is_string());
    assert!(body.get("errors").is_none());

    assert_eq!(ctx.stored_events(), 5);
}

/// Stored rows are snake_case records with server ids.
#[tokio::test]
async fn test_stored_rows_keep_event_fields() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut event = fixtures::click("Pricing", "Buy", Some("Home"), "s1");
    event["userId"] = json!("u1@example.com");
    event["properties"] = json!({ "plan": "pro" });

    server
        .post("/api/track")
        .json(&fixtures::track_payload(vec![event]))
        .await
        .assert_status_ok();

    let rows = ctx.store.query_events(&EventFilter::new()).await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.event_name, "Click_Pricing_Buy");
    assert_eq!(row.component_name.as_deref(), Some("Buy"));
    assert_eq!(row.refer.as_deref(), Some("Home"));
    assert_eq!(row.user_id.as_deref(), Some("u1@example.com"));
    assert_eq!(row.property("plan"), Some(&json!("pro")));

    let value = serde_json::to_value(row).unwrap();
    assert!(value.get("session_id").is_some());
    assert!(value.get("id").is_some());
}

/// Each batch upserts one aggregate per session; later batches accumulate.
#[tokio::test]
async fn test_sessions_accumulate_across_batches() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/api/track")
        .json(&fixtures::track_payload(vec![
            fixtures::view("Home", "s1"),
            fixtures::click("Home", "Signup", None, "s1"),
            fixtures::view("Home", "s2"),
        ]))
        .await
        .assert_status_ok();

    let mut later = fixtures::view("Pricing", "s1");
    later["userId"] = json!("u1");
    server
        .post("/api/track")
        .json(&fixtures::track_payload(vec![later]))
        .await
        .assert_status_ok();

    let s1 = ctx.store.memory().session("s1").expect("session s1");
    assert_eq!(s1.total_events, 3);
    assert_eq!(s1.total_views, 2);
    assert_eq!(s1.total_clicks, 1);
    assert_eq!(s1.entry_page, "Home");
    assert_eq!(s1.user_id.as_deref(), Some("u1"));
    assert_eq!(s1.browser, "Chrome");

    let s2 = ctx.store.memory().session("s2").expect("session s2");
    assert_eq!(s2.total_events, 1);

    let response = server.get("/api/analytics/sessions").add_query_param("limit", 1).await;
    response.assert_status_ok();
    let sessions: Vec<serde_json::Value> = response.json();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], "s1");
}

/// Empty events array is accepted and stores nothing.
#[tokio::test]
async fn test_empty_batch() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/track")
        .json(&fixtures::track_payload(vec![]))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 0);
    assert_eq!(ctx.stored_events(), 0);
}

/// Missing descriptors are stored as "unknown".
#[tokio::test]
async fn test_minimal_event_defaults() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let minimal = json!({
        "eventType": "expose",
        "eventName": "Expose_Home_Element",
        "pageName": "Home",
        "timestamp": "2024-01-01T12:00:00Z",
        "sessionId": "s1"
    });
    server
        .post("/api/track")
        .json(&fixtures::track_payload(vec![minimal]))
        .await
        .assert_status_ok();

    let rows = ctx.store.query_events(&EventFilter::new()).await.unwrap();
    assert_eq!(rows[0].device_type, "unknown");
    assert_eq!(rows[0].network_type, "unknown");
}
