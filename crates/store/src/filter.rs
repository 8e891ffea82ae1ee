//! Row filters for event queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracking_core::{EventRecord, EventType};

/// Timestamp ordering of query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Equality and range filters over the event log.
///
/// Every set field must match. `event_names` matches any of its entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub event_names: Vec<String>,
    pub event_type: Option<EventType>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    /// Inclusive lower bound on the event timestamp
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the event timestamp
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_names.push(name.into());
        self
    }

    pub fn event_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row passes every equality and range filter.
    pub fn matches(&self, record: &EventRecord) -> bool {
        if !self.event_names.is_empty() && !self.event_names.iter().any(|n| *n == record.event_name) {
            return false;
        }
        if self.event_type.is_some_and(|t| t != record.event_type) {
            return false;
        }
        if self.session_id.as_ref().is_some_and(|s| *s != record.session_id) {
            return false;
        }
        if let Some(user_id) = &self.user_id {
            if record.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if self.since.is_some_and(|since| record.timestamp < since) {
            return false;
        }
        if self.until.is_some_and(|until| record.timestamp >= until) {
            return false;
        }
        true
    }
}
