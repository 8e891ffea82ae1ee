//! Tracking event definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::device::DeviceInfo;

/// Free-form caller-supplied properties.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Interaction kinds the SDK records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    View,
    Click,
    Expose,
    Disappear,
}

impl EventType {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::Expose => "expose",
            Self::Disappear => "disappear",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tracked interaction, immutable once built.
///
/// Serialized in camelCase; this is the wire format of `POST /api/track`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub event_type: EventType,
    /// `{TypePrefix}_{PageName}[_{SubjectName}]`
    #[validate(length(min = 1, max = 256))]
    pub event_name: String,
    /// Canonical page name
    #[validate(length(max = 128))]
    pub page_name: String,
    /// Button/element name, absent for page views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 128))]
    pub component_name: Option<String>,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Previous page's canonical name at build time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 128))]
    pub refer: Option<String>,
    /// Seconds continuously visible, disappear events only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 128))]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 128))]
    pub company_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    /// Device and network descriptors
    #[serde(flatten)]
    pub device: DeviceInfo,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub page_url: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub page_title: String,
    #[serde(default)]
    pub viewport_width: u32,
    #[serde(default)]
    pub viewport_height: u32,
    /// At most `MAX_PROPERTIES_BYTES` once serialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Batch payload delivered by the SDK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<TrackingEvent>,
}
