//! Ingest payload parsing and transformation to persisted rows.
//!
//! This module handles:
//! - Parsing the `{ "events": [...] }` body and enforcing batch limits
//! - Validating each event independently
//! - Transforming to the persisted row format (snake_case, server id)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result, ValidationErrorCode};
use crate::events::{EventType, Properties, TrackingEvent};
use crate::limits::{MAX_BATCH_EVENTS, MAX_BATCH_SIZE_BYTES, MAX_PROPERTIES_BYTES};

/// Message returned when the body has no `events` array.
pub const EVENTS_REQUIRED: &str = "Invalid request: events array is required";

/// Parsed ingest body. Events stay raw so one malformed event does not
/// reject its neighbours.
#[derive(Debug, Clone)]
pub struct TrackPayload {
    pub events: Vec<Value>,
}

impl TrackPayload {
    /// Parse an ingest body from JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_BATCH_SIZE_BYTES {
            return Err(Error::validation_code(
                ValidationErrorCode::BatchTooLarge,
                format!(
                    "payload of {} bytes exceeds {} byte limit",
                    bytes.len(),
                    MAX_BATCH_SIZE_BYTES
                ),
            ));
        }

        let value: Value = serde_json::from_slice(bytes).map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidFormat,
                format!("invalid JSON: {}", e),
            )
        })?;

        let events = match value {
            Value::Object(mut obj) => match obj.remove("events") {
                Some(Value::Array(events)) => events,
                _ => return Err(Error::validation_code(ValidationErrorCode::InvalidFormat, EVENTS_REQUIRED)),
            },
            _ => return Err(Error::validation_code(ValidationErrorCode::InvalidFormat, EVENTS_REQUIRED)),
        };

        if events.len() > MAX_BATCH_EVENTS {
            return Err(Error::validation_code(
                ValidationErrorCode::BatchTooLarge,
                format!("batch of {} events exceeds {} limit", events.len(), MAX_BATCH_EVENTS),
            ));
        }

        Ok(Self { events })
    }
}

/// Persisted event row (snake_case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Server-assigned row id
    pub id: Uuid,
    pub event_type: EventType,
    pub event_name: String,
    pub page_name: String,
    pub component_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub refer: Option<String>,
    pub expose_time: Option<u64>,
    pub session_id: String,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub device_type: String,
    pub device_model: String,
    pub os: String,
    pub os_version: String,
    pub browser: String,
    pub browser_version: String,
    pub network_type: String,
    pub network_effective_type: String,
    pub page_url: String,
    pub page_title: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub properties: Option<Properties>,
    pub received_at: DateTime<Utc>,
}

impl EventRecord {
    /// Transform a tracked event into a row received at `received_at`.
    pub fn from_tracking(event: TrackingEvent, received_at: DateTime<Utc>) -> Self {
        let device = event.device;
        Self {
            id: Uuid::new_v4(),
            event_type: event.event_type,
            event_name: event.event_name,
            page_name: event.page_name,
            component_name: event.component_name,
            timestamp: event.timestamp,
            refer: event.refer,
            expose_time: event.expose_time,
            session_id: event.session_id,
            user_id: event.user_id,
            company_id: event.company_id,
            device_type: device.device_type,
            device_model: device.device_model,
            os: device.os,
            os_version: device.os_version,
            browser: device.browser,
            browser_version: device.browser_version,
            network_type: device.network_type,
            network_effective_type: device.network_effective_type,
            page_url: event.page_url,
            page_title: event.page_title,
            viewport_width: event.viewport_width,
            viewport_height: event.viewport_height,
            properties: event.properties,
            received_at,
        }
    }

    /// Grouping identity: user ID if present, else session ID.
    pub fn identity(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.session_id)
    }

    /// Looks up a custom property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }
}

/// Validate a tracked event.
pub fn validate_event(event: &TrackingEvent) -> Result<()> {
    if event.session_id.trim().is_empty() {
        return Err(Error::missing_field("sessionId"));
    }
    if event.event_name.trim().is_empty() {
        return Err(Error::missing_field("eventName"));
    }
    event
        .validate()
        .map_err(|e| Error::validation(format!("{}", e)))?;

    if let Some(props) = event.properties.as_ref().filter(|p| !p.is_empty()) {
        let size = serde_json::to_vec(props)?.len();
        if size > MAX_PROPERTIES_BYTES {
            return Err(Error::validation_code(
                ValidationErrorCode::EventTooLarge,
                format!(
                    "properties of {} bytes exceeds {} byte limit",
                    size, MAX_PROPERTIES_BYTES
                ),
            ));
        }
    }
    Ok(())
}

/// Validate and transform a batch of raw events.
///
/// Invalid events are reported by index and skipped; the rest are kept in
/// their original order.
pub fn transform_batch(events: Vec<Value>) -> (Vec<EventRecord>, Vec<Error>) {
    let received_at = Utc::now();
    let mut records = Vec::with_capacity(events.len());
    let mut errors = Vec::new();

    for (i, raw) in events.into_iter().enumerate() {
        let event: TrackingEvent = match serde_json::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                errors.push(Error::validation(format!("event[{}]: {}", i, e)));
                continue;
            }
        };

        if let Err(e) = validate_event(&event) {
            errors.push(Error::validation(format!("event[{}]: {}", i, e)));
            continue;
        }

        records.push(EventRecord::from_tracking(event, received_at));
    }

    (records, errors)
}
