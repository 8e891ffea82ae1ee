//! Test fixtures and event generators.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

pub const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// A valid wire event (camelCase) timestamped now.
pub fn wire_event(event_type: &str, event_name: &str, page: &str, session_id: &str) -> Value {
    wire_event_at(event_type, event_name, page, session_id, Utc::now())
}

/// A valid wire event at a fixed instant.
pub fn wire_event_at(
    event_type: &str,
    event_name: &str,
    page: &str,
    session_id: &str,
    at: DateTime<Utc>,
) -> Value {
    json!({
        "eventType": event_type,
        "eventName": event_name,
        "pageName": page,
        "timestamp": at.to_rfc3339(),
        "sessionId": session_id,
        "deviceType": "desktop",
        "deviceModel": "desktop",
        "os": "macOS",
        "osVersion": "10.15",
        "browser": "Chrome",
        "browserVersion": "120",
        "pageUrl": format!("https://example.com/{}", page.to_lowercase()),
        "pageTitle": page,
        "viewportWidth": 1280,
        "viewportHeight": 720
    })
}

/// Page view of `page` in `session_id`.
pub fn view(page: &str, session_id: &str) -> Value {
    wire_event("view", &format!("View_{}", page), page, session_id)
}

/// Click on `button` on `page`, referred from `refer`.
pub fn click(page: &str, button: &str, refer: Option<&str>, session_id: &str) -> Value {
    let mut event = wire_event(
        "click",
        &format!("Click_{}_{}", page, button),
        page,
        session_id,
    );
    event["componentName"] = json!(button);
    if let Some(refer) = refer {
        event["refer"] = json!(refer);
    }
    event
}

/// N page views spread over `sessions` sessions.
pub fn views(n: usize, sessions: usize) -> Vec<Value> {
    (0..n)
        .map(|i| view("Home", &format!("session_test_{}", i % sessions.max(1))))
        .collect()
}

/// `{ "events": [...] }` body.
pub fn track_payload(events: Vec<Value>) -> Value {
    json!({ "events": events })
}

/// A batch that exceeds the event limit.
pub fn oversized_batch() -> Vec<Value> {
    views(1001, 10)
}

/// An event whose properties exceed the size limit.
pub fn oversized_properties_event(session_id: &str) -> Value {
    let mut event = view("Home", session_id);
    event["properties"] = json!({ "blob": "x".repeat(20_000) });
    event
}
