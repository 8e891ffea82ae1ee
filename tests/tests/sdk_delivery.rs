//! Tracker SDK delivery, end to end.
//!
//! Tracker → DeliveryQueue → transport → POST /api/track → store → analytics

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracker_sdk::{
    EventTransport, HostSignal, StaticEnvironment, Tracker, TrackerConfig,
    TrackerOptions,
};

use integration_tests::{fixtures, mocks::MockTransport, setup::TestContext};

fn mock_tracker(transport: &MockTransport) -> Tracker {
    let env = StaticEnvironment::new("https://example.com/").with_user_agent(fixtures::SAFARI_IPHONE);
    Tracker::init(
        TrackerOptions::default(),
        Arc::new(env),
        Arc::new(transport.clone()) as Arc<dyn EventTransport>,
    )
}

/// Two visitors through the real router produce the expected funnel.
#[tokio::test]
async fn test_sdk_to_funnel_round_trip() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let converted = ctx.tracker("https://example.com/");
    converted.page().view(None);
    tokio::time::sleep(Duration::from_millis(5)).await;
    converted.navigate("https://example.com/signup");
    converted.button().name("Submit").click(None);
    converted.flush().await;

    let bounced = ctx.tracker("https://example.com/");
    bounced.page().view(None);
    bounced.flush().await;

    assert_ne!(converted.session_id(), bounced.session_id());
    assert_eq!(converted.pending(), 0);
    assert_eq!(ctx.stored_events(), 3);

    let response = server
        .post("/api/analytics/funnel")
        .json(&json!({ "steps": ["View_Home", "Click_Signup_Submit"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body[0]["count"], 2);
    assert_eq!(body[1]["count"], 1);
    assert_eq!(body[1]["rate"], 50.0);

    let session = ctx
        .store
        .memory()
        .session(converted.session_id())
        .expect("converted session");
    assert_eq!(session.total_views, 1);
    assert_eq!(session.total_clicks, 1);
    assert_eq!(session.entry_page, "Home");
    assert_eq!(session.browser, "Chrome");

    converted.shutdown().await;
    bounced.shutdown().await;
}

/// Without session storage every call is a no-op.
#[tokio::test]
async fn test_disabled_environment() {
    let transport = MockTransport::new();
    let tracker = Tracker::init(
        TrackerOptions::default(),
        Arc::new(StaticEnvironment::disabled()),
        Arc::new(transport.clone()) as Arc<dyn EventTransport>,
    );

    tracker.page().view(None);
    tracker.button().click(None);
    tracker.flush().await;
    tracker.handle_signal(HostSignal::Unload).await;

    assert!(!tracker.is_enabled());
    assert_eq!(tracker.pending(), 0);
    assert!(transport.batches().is_empty());
}

/// A failed flush keeps the events; the next flush delivers them in order.
#[tokio::test]
async fn test_retry_after_failure() {
    let transport = MockTransport::new();
    let tracker = mock_tracker(&transport);

    transport.set_should_fail(true);
    tracker.page().view(None);
    tracker.button().name("A").click(None);
    tracker.flush().await;
    assert_eq!(tracker.pending(), 2);

    tracker.button().name("B").click(None);
    transport.set_should_fail(false);
    tracker.flush().await;

    let names: Vec<String> = transport.events().into_iter().map(|e| e.event_name).collect();
    assert_eq!(names, vec!["View_Home", "Click_Home_A", "Click_Home_B"]);
    assert_eq!(transport.batches().len(), 1);
    assert_eq!(tracker.pending(), 0);

    tracker.shutdown().await;
}

/// `configure` changes the endpoint and identity for later events.
#[tokio::test]
async fn test_configure_endpoint_and_identity() {
    let transport = MockTransport::new();
    let tracker = mock_tracker(&transport);

    tracker.configure(TrackerConfig::new().with_user_id("u1").with_api_endpoint("/collect"));
    tracker.element().name("Banner").expose(None);
    tracker.flush().await;

    assert_eq!(transport.endpoints(), vec!["/collect"]);
    let event = &transport.events()[0];
    assert_eq!(event.user_id.as_deref(), Some("u1"));
    assert_eq!(event.device.device_type, "mobile");
    assert_eq!(event.device.os, "iOS");

    tracker.shutdown().await;
}

/// Hidden and unload signals from an attached channel trigger delivery.
#[tokio::test]
async fn test_attached_signals_flush() {
    let transport = MockTransport::new();
    let tracker = mock_tracker(&transport);
    let (tx, rx) = mpsc::channel(8);
    tracker.attach(rx);

    tracker.page().view(None);
    tx.send(HostSignal::Navigated("/pricing".into())).await.unwrap();
    tx.send(HostSignal::Hidden).await.unwrap();

    for _ in 0..50 {
        if !transport.batches().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(transport.batches().len(), 1);
    assert_eq!(tracker.current_page(), "Pricing");

    tracker.element().disappear(4, None);
    tracker.shutdown().await;

    let events = transport.events();
    let last = events.last().unwrap();
    assert_eq!(last.event_name, "Disappear_Pricing_Element");
    assert_eq!(last.expose_time, Some(4));
    assert_eq!(last.refer.as_deref(), Some("Home"));
}

/// A tracker connected by base URL posts to a live server.
#[tokio::test]
async fn test_http_transport_delivers() {
    let ctx = TestContext::new();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = ctx.router.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let options = TrackerOptions {
        base_url: format!("http://{}", addr),
        ..TrackerOptions::default()
    };
    let tracker = Tracker::connect(options, Arc::new(StaticEnvironment::new("/docs"))).unwrap();

    tracker.page().view(None);
    tracker.flush().await;
    assert_eq!(tracker.pending(), 0);
    assert_eq!(ctx.stored_events(), 1);

    // Unknown endpoint: 404 keeps the event buffered
    tracker.configure(TrackerConfig::new().with_api_endpoint("/nope"));
    tracker.page().view(None);
    tracker.flush().await;
    assert_eq!(tracker.pending(), 1);

    tracker.shutdown().await;
    server.abort();
}

