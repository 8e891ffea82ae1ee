//! Store configuration.

use serde::{Deserialize, Serialize};

/// Event store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Retention bound on stored events. Oldest rows are evicted first.
    /// Unbounded when absent.
    #[serde(default)]
    pub max_events: Option<usize>,
}

impl StoreConfig {
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }
}
