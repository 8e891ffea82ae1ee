//! Server-side session aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::EventType;
use crate::record::EventRecord;

/// Per-session statistics, upserted on every ingested batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAggregate {
    /// Session ID
    pub id: String,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    /// Timestamp of the first event seen for this session
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub total_events: u64,
    pub total_views: u64,
    pub total_clicks: u64,
    pub total_exposes: u64,
    pub total_disappears: u64,
    pub device_type: String,
    pub device_model: String,
    pub os: String,
    pub browser: String,
    /// Page of the first event seen for this session
    pub entry_page: String,
}

impl SessionAggregate {
    /// Builds one aggregate per distinct session ID, in order of first
    /// appearance in `records`.
    pub fn from_records(records: &[EventRecord]) -> Vec<Self> {
        let mut sessions: Vec<Self> = Vec::new();

        for record in records {
            match sessions.iter_mut().find(|s| s.id == record.session_id) {
                Some(session) => session.record(record),
                None => {
                    let mut session = Self::new(record);
                    session.record(record);
                    sessions.push(session);
                }
            }
        }

        sessions
    }

    fn new(first: &EventRecord) -> Self {
        Self {
            id: first.session_id.clone(),
            user_id: first.user_id.clone(),
            company_id: first.company_id.clone(),
            started_at: first.timestamp,
            last_activity_at: first.timestamp,
            total_events: 0,
            total_views: 0,
            total_clicks: 0,
            total_exposes: 0,
            total_disappears: 0,
            device_type: first.device_type.clone(),
            device_model: first.device_model.clone(),
            os: first.os.clone(),
            browser: first.browser.clone(),
            entry_page: first.page_name.clone(),
        }
    }

    fn record(&mut self, record: &EventRecord) {
        self.total_events += 1;
        match record.event_type {
            EventType::View => self.total_views += 1,
            EventType::Click => self.total_clicks += 1,
            EventType::Expose => self.total_exposes += 1,
            EventType::Disappear => self.total_disappears += 1,
        }
        if record.timestamp > self.last_activity_at {
            self.last_activity_at = record.timestamp;
        }
        if record.timestamp < self.started_at {
            self.started_at = record.timestamp;
        }
    }

    /// Merges a newer batch's aggregate for the same session into this one.
    ///
    /// Counts accumulate. Device and identity take the newer values when
    /// present. `entry_page` and `started_at` keep the values from creation.
    pub fn merge(&mut self, newer: &SessionAggregate) {
        self.total_events += newer.total_events;
        self.total_views += newer.total_views;
        self.total_clicks += newer.total_clicks;
        self.total_exposes += newer.total_exposes;
        self.total_disappears += newer.total_disappears;

        if newer.last_activity_at > self.last_activity_at {
            self.last_activity_at = newer.last_activity_at;
        }
        if newer.user_id.is_some() {
            self.user_id = newer.user_id.clone();
        }
        if newer.company_id.is_some() {
            self.company_id = newer.company_id.clone();
        }

        replace_known(&mut self.device_type, &newer.device_type);
        replace_known(&mut self.device_model, &newer.device_model);
        replace_known(&mut self.os, &newer.os);
        replace_known(&mut self.browser, &newer.browser);
    }
}

fn replace_known(current: &mut String, newer: &str) {
    if !newer.is_empty() && newer != crate::device::UNKNOWN {
        *current = newer.to_string();
    }
}
