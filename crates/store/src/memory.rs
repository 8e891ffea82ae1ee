//! In-memory event store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};
use tracking_core::{EventRecord, Result, SessionAggregate};

use crate::config::StoreConfig;
use crate::filter::{EventFilter, SortOrder};
use crate::{EventStore, Overview};

/// Event log and session table held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: StoreConfig,
    events: RwLock<VecDeque<EventRecord>>,
    sessions: RwLock<HashMap<String, SessionAggregate>>,
}

impl MemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            events: RwLock::new(VecDeque::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Looks up one session aggregate.
    pub fn session(&self, id: &str) -> Option<SessionAggregate> {
        self.sessions.read().get(id).cloned()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_events(&self, records: Vec<EventRecord>) -> Result<usize> {
        let count = records.len();
        let mut events = self.events.write();
        events.extend(records);

        if let Some(max) = self.config.max_events {
            let overflow = events.len().saturating_sub(max);
            if overflow > 0 {
                events.drain(..overflow);
                warn!(evicted = overflow, max_events = max, "Evicted oldest events");
            }
        }

        debug!(count, total = events.len(), "Inserted events");
        Ok(count)
    }

    async fn upsert_sessions(&self, batch: Vec<SessionAggregate>) -> Result<usize> {
        let count = batch.len();
        let mut sessions = self.sessions.write();

        for aggregate in batch {
            match sessions.get_mut(&aggregate.id) {
                Some(existing) => existing.merge(&aggregate),
                None => {
                    sessions.insert(aggregate.id.clone(), aggregate);
                }
            }
        }

        debug!(count, total = sessions.len(), "Upserted sessions");
        Ok(count)
    }

    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let mut rows: Vec<EventRecord> = self
            .events
            .read()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal timestamps.
        match filter.order {
            SortOrder::Asc => rows.sort_by_key(|r| r.timestamp),
            SortOrder::Desc => rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }

        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn sessions(&self, limit: Option<usize>) -> Result<Vec<SessionAggregate>> {
        let mut sessions: Vec<SessionAggregate> = self.sessions.read().values().cloned().collect();
        sessions.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));

        if let Some(limit) = limit {
            sessions.truncate(limit);
        }
        Ok(sessions)
    }

    async fn overview(&self) -> Result<Overview> {
        let events = self.events.read();
        let unique_users: HashSet<&str> = events
            .iter()
            .filter_map(|r| r.user_id.as_deref())
            .collect();

        Ok(Overview {
            total_events: events.len() as u64,
            total_sessions: self.sessions.read().len() as u64,
            unique_users: unique_users.len() as u64,
        })
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
