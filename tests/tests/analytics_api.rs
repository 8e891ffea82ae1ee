//! Analytics panel endpoints over ingested events.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

async fn ingest(server: &TestServer, events: Vec<Value>) {
    server
        .post("/api/track")
        .json(&fixtures::track_payload(events))
        .await
        .assert_status_ok();
}

fn purchase(session: &str, amount: Value) -> Value {
    let mut event = fixtures::click("Cart", "Buy", Some("Pricing"), session);
    event["properties"] = json!({ "amount": amount });
    event
}

/// avg over [10, "bad", 20] is 15.00; non-numeric values are discarded.
#[tokio::test]
async fn test_metric_avg_and_sum() {
    let ctx = TestContext::new();
    let server = ctx.server();
    ingest(
        &server,
        vec![
            purchase("s1", json!(10)),
            purchase("s2", json!("bad")),
            purchase("s3", json!("20")),
        ],
    )
    .await;

    let response = server
        .post("/api/analytics/metric")
        .json(&json!({
            "metric": "avg",
            "eventName": "Click_Cart_Buy",
            "propertyName": "amount"
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["display"], "15.00");

    let body: Value = server
        .post("/api/analytics/metric")
        .json(&json!({ "metric": "sum", "eventName": "Click_Cart_Buy", "propertyName": "amount" }))
        .await
        .json();
    assert_eq!(body["display"], "30.00");

    let body: Value = server
        .post("/api/analytics/metric")
        .json(&json!({ "metric": "count", "eventName": "Click_Cart_Buy" }))
        .await
        .json();
    assert_eq!(body["display"], "3");

    let body: Value = server
        .post("/api/analytics/metric")
        .json(&json!({ "metric": "avg", "eventName": "Click_Cart_Buy" }))
        .await
        .json();
    assert_eq!(body["display"], "N/A");
}

/// Requested names come back in order, zero-filled.
#[tokio::test]
async fn test_bar_distribution() {
    let ctx = TestContext::new();
    let server = ctx.server();
    ingest(
        &server,
        vec![
            fixtures::view("Home", "s1"),
            fixtures::view("Home", "s2"),
            fixtures::view("Pricing", "s1"),
        ],
    )
    .await;

    let response = server
        .post("/api/analytics/bar")
        .json(&json!({ "eventNames": ["View_Pricing", "View_Home", "View_Missing"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            { "name": "View_Pricing", "count": 1 },
            { "name": "View_Home", "count": 2 },
            { "name": "View_Missing", "count": 0 }
        ])
    );
}

/// Two events on one day: one day bucket of 2, two hour buckets of 1.
#[tokio::test]
async fn test_trend_buckets() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let day = (Utc::now() - Duration::days(1)).date_naive();
    let at = |h, m| day.and_hms_opt(h, m, 0).unwrap().and_utc();
    ingest(
        &server,
        vec![
            fixtures::wire_event_at("view", "View_Home", "Home", "s1", at(10, 15)),
            fixtures::wire_event_at("view", "View_Home", "Home", "s2", at(11, 45)),
        ],
    )
    .await;

    let body: Value = server
        .post("/api/analytics/trend")
        .json(&json!({ "eventNames": ["View_Home"], "interval": "day", "metricType": "count" }))
        .await
        .json();
    let points = body[0]["points"].as_array().unwrap();
    assert_eq!(body[0]["eventName"], "View_Home");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["value"], 2.0);

    let body: Value = server
        .post("/api/analytics/trend")
        .json(&json!({ "eventNames": ["View_Home"], "interval": "hour" }))
        .await
        .json();
    let points = body[0]["points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert!(points.iter().all(|p| p["value"] == 1.0));
}

/// Funnel counts per identity with referrer matching.
#[tokio::test]
async fn test_funnel_unique_and_total() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut first_click = fixtures::click("Signup", "Submit", Some("Home"), "s1");
    first_click["timestamp"] = json!((Utc::now() + Duration::seconds(5)).to_rfc3339());
    let mut second_click = first_click.clone();
    second_click["timestamp"] = json!((Utc::now() + Duration::seconds(9)).to_rfc3339());
    ingest(
        &server,
        vec![
            fixtures::view("Home", "s1"),
            fixtures::view("Home", "s2"),
            first_click,
            second_click,
        ],
    )
    .await;

    let query = json!({
        "steps": ["View_Home", "Click_Signup_Submit"],
        "timeWindow": 7,
        "countMode": "unique"
    });
    let body: Value = server.post("/api/analytics/funnel").json(&query).await.json();
    assert_eq!(body[0]["count"], 2);
    assert_eq!(body[0]["rate"], 100.0);
    assert_eq!(body[1]["count"], 1);
    assert_eq!(body[1]["rate"], 50.0);

    let mut total = query.clone();
    total["countMode"] = json!("total");
    let body: Value = server.post("/api/analytics/funnel").json(&total).await.json();
    assert_eq!(body[1]["count"], 2);

    let body: Value = server
        .post("/api/analytics/funnel")
        .json(&json!({ "steps": [] }))
        .await
        .json();
    assert_eq!(body, json!([]));
}

/// Panel filter narrows to one session.
#[tokio::test]
async fn test_panel_filter_by_session() {
    let ctx = TestContext::new();
    let server = ctx.server();
    ingest(&server, fixtures::views(6, 3)).await;

    let body: Value = server
        .post("/api/analytics/metric")
        .json(&json!({ "metric": "count", "filter": { "sessionId": "session_test_0" } }))
        .await
        .json();
    assert_eq!(body["display"], "2");
}

/// Overview counts events, sessions and distinct users.
#[tokio::test]
async fn test_overview() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut with_user = fixtures::view("Home", "s3");
    with_user["userId"] = json!("u1");
    ingest(&server, vec![fixtures::view("Home", "s1"), fixtures::view("Home", "s2"), with_user]).await;

    let response = server.get("/api/analytics/overview").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["totalEvents"], 3);
    assert_eq!(body["totalSessions"], 3);
    assert_eq!(body["uniqueUsers"], 1);
}

/// An unknown reduction is not applicable rather than a request error.
#[tokio::test]
async fn test_unknown_metric_is_not_applicable() {
    let ctx = TestContext::new();
    let server = ctx.server();
    ingest(&server, vec![purchase("s1", json!(10))]).await;

    let response = server
        .post("/api/analytics/metric")
        .json(&json!({ "metric": "median", "eventName": "Click_Cart_Buy", "propertyName": "amount" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["display"], "N/A");
}

/// Panel configs of the wrong shape get a coded 400, not a bare 422.
#[tokio::test]
async fn test_malformed_panel_config() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for body in [json!({ "steps": "View_Home" }), json!({ "steps": ["View_Home"], "timeWindow": -1 })] {
        let response = server.post("/api/analytics/funnel").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALID_001");
    }

    let response = server
        .post("/api/analytics/trend")
        .content_type("application/json")
        .text("{not json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}
