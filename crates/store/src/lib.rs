//! Event log and session store for the tracking engine.
//!
//! The analytics layer only sees the [`EventStore`] trait; the in-memory
//! implementation backs the server and the tests.

pub mod config;
pub mod filter;
pub mod memory;

pub use config::*;
pub use filter::*;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracking_core::{EventRecord, Result, SessionAggregate};

/// Dashboard header counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_events: u64,
    pub total_sessions: u64,
    /// Distinct non-null user IDs across all events
    pub unique_users: u64,
}

/// Storage collaborator for ingested events and session aggregates.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends rows to the event log. Returns the number stored.
    async fn insert_events(&self, records: Vec<EventRecord>) -> Result<usize>;

    /// Creates or merges session aggregates by session ID.
    async fn upsert_sessions(&self, sessions: Vec<SessionAggregate>) -> Result<usize>;

    /// Fetches rows matching `filter`.
    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>>;

    /// Most recently active sessions first.
    async fn sessions(&self, limit: Option<usize>) -> Result<Vec<SessionAggregate>>;

    async fn overview(&self) -> Result<Overview>;

    fn is_healthy(&self) -> bool;
}
