//! Panel time ranges and identity filters.

use chrono::{DateTime, Duration, Utc};
use event_store::EventFilter;
use serde::{Deserialize, Serialize};

/// Look-back window of a panel. Unknown values fall back to seven days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TimeRange {
    #[serde(rename = "1d")]
    OneDay,
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl TimeRange {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "1d" => Self::OneDay,
            "30d" => Self::ThirtyDays,
            "90d" => Self::NinetyDays,
            _ => Self::SevenDays,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
            Self::NinetyDays => 90,
        }
    }

    /// Start of the range ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

impl From<String> for TimeRange {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// Optional session / user scoping shared by every panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelFilter {
    #[serde(default)]
    pub session_id: Option<String>,
    /// User ID; dashboards send the signed-in user's email here.
    #[serde(default, alias = "email")]
    pub user_id: Option<String>,
}

impl PanelFilter {
    /// Narrows `filter` by the non-blank fields of this panel filter.
    pub fn apply(&self, mut filter: EventFilter) -> EventFilter {
        if let Some(session_id) = non_blank(&self.session_id) {
            filter = filter.session_id(session_id);
        }
        if let Some(user_id) = non_blank(&self.user_id) {
            filter = filter.user_id(user_id);
        }
        filter
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
