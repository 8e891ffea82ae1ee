//! Mock implementations for testing.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use event_store::{EventFilter, EventStore, MemoryStore, Overview, StoreConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tower::ServiceExt;
use tracker_sdk::EventTransport;
use tracking_core::error::DbErrorCode;
use tracking_core::{Error, EventRecord, Result, SessionAggregate, TrackingEvent};

/// Store double backed by a real [`MemoryStore`] with switchable failure.
#[derive(Clone)]
pub struct MockStore {
    inner: Arc<MemoryStore>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(MemoryStore::new(config)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// The wrapped store, for direct inspection.
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::database(DbErrorCode::StoreFailed, "Mock store failure"));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MockStore {
    async fn insert_events(&self, records: Vec<EventRecord>) -> Result<usize> {
        self.check()?;
        self.inner.insert_events(records).await
    }

    async fn upsert_sessions(&self, sessions: Vec<SessionAggregate>) -> Result<usize> {
        self.check()?;
        self.inner.upsert_sessions(sessions).await
    }

    async fn query_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        self.check()?;
        self.inner.query_events(filter).await
    }

    async fn sessions(&self, limit: Option<usize>) -> Result<Vec<SessionAggregate>> {
        self.check()?;
        self.inner.sessions(limit).await
    }

    async fn overview(&self) -> Result<Overview> {
        self.check()?;
        self.inner.overview().await
    }

    fn is_healthy(&self) -> bool {
        !*self.should_fail.lock()
    }
}

/// SDK transport that records batches instead of sending them.
#[derive(Clone, Default)]
pub struct MockTransport {
    batches: Arc<Mutex<Vec<(String, Vec<TrackingEvent>)>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered batches in order.
    pub fn batches(&self) -> Vec<Vec<TrackingEvent>> {
        self.batches.lock().iter().map(|(_, b)| b.clone()).collect()
    }

    /// Endpoints of delivered batches in order.
    pub fn endpoints(&self) -> Vec<String> {
        self.batches.lock().iter().map(|(e, _)| e.clone()).collect()
    }

    /// All delivered events, flattened.
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.batches
            .lock()
            .iter()
            .flat_map(|(_, b)| b.iter().cloned())
            .collect()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

#[async_trait]
impl EventTransport for MockTransport {
    async fn send(&self, endpoint: &str, events: &[TrackingEvent]) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::transport("Mock transport failure"));
        }
        self.batches
            .lock()
            .push((endpoint.to_string(), events.to_vec()));
        Ok(())
    }
}

/// SDK transport that calls the API router in-process.
#[derive(Clone)]
pub struct RouterTransport {
    router: Router,
}

impl RouterTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventTransport for RouterTransport {
    async fn send(&self, endpoint: &str, events: &[TrackingEvent]) -> Result<()> {
        let body = serde_json::to_vec(&serde_json::json!({ "events": events }))?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .map_err(|e| Error::internal(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!("ingest returned {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_mock_store_failure_mode() {
        let store = MockStore::new();
        store.set_should_fail(true);

        assert!(store.insert_events(vec![]).await.is_err());
        assert!(!store.is_healthy());

        store.set_should_fail(false);
        assert_eq!(store.insert_events(vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_transport_records_batches() {
        let transport = MockTransport::new();
        let event: TrackingEvent =
            serde_json::from_value(fixtures::view("Home", "session_test_0")).unwrap();

        transport.send("/api/track", &[event.clone()]).await.unwrap();
        assert_eq!(transport.batches().len(), 1);
        assert_eq!(transport.endpoints(), vec!["/api/track"]);

        transport.set_should_fail(true);
        assert!(transport.send("/api/track", &[event]).await.is_err());
        assert_eq!(transport.events().len(), 1);
    }
}
