//! Application state shared across handlers.

use analytics::AnalyticsService;
use event_store::EventStore;
use std::sync::Arc;
use tracking_core::limits::MAX_BATCH_EVENTS;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Event log and session table
    pub store: Arc<dyn EventStore>,
    /// Panel queries over `store`
    pub analytics: AnalyticsService,
    /// Per-request event cap, at most [`MAX_BATCH_EVENTS`]
    pub max_batch_events: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            analytics: AnalyticsService::new(store.clone()),
            store,
            max_batch_events: MAX_BATCH_EVENTS,
        }
    }

    /// Lowers the per-request event cap. Values above the hard limit are
    /// clamped to it.
    pub fn with_max_batch_events(mut self, max: usize) -> Self {
        self.max_batch_events = max.clamp(1, MAX_BATCH_EVENTS);
        self
    }
}
