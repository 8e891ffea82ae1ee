//! Host environment abstraction.
//!
//! The tracker never reaches for globals. Everything it reads from the
//! browsing context (storage, location, user agent, viewport) comes through
//! a [`HostEnvironment`].

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracking_core::NetworkStatus;

/// Context-local key/value storage (session storage in a browser).
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory [`SessionStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

/// Capabilities of the browsing context the tracker runs in.
pub trait HostEnvironment: Send + Sync {
    /// `None` when the host has no persistent storage, which disables
    /// tracking.
    fn session_storage(&self) -> Option<Arc<dyn SessionStorage>>;

    /// Location at startup, absolute URL or root-relative path.
    fn location(&self) -> String;

    fn user_agent(&self) -> Option<String>;

    fn network(&self) -> Option<NetworkStatus>;

    fn title(&self) -> String;

    /// Viewport `(width, height)` in CSS pixels.
    fn viewport(&self) -> (u32, u32);
}

/// Fixed-value [`HostEnvironment`] for servers, tests and embedding hosts.
#[derive(Clone)]
pub struct StaticEnvironment {
    storage: Option<Arc<dyn SessionStorage>>,
    location: String,
    user_agent: Option<String>,
    network: Option<NetworkStatus>,
    title: String,
    viewport: (u32, u32),
}

impl StaticEnvironment {
    /// Environment at `location` backed by fresh [`MemoryStorage`].
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            storage: Some(Arc::new(MemoryStorage::new())),
            location: location.into(),
            user_agent: None,
            network: None,
            title: String::new(),
            viewport: (0, 0),
        }
    }

    /// Environment without storage; a tracker built on it does nothing.
    pub fn disabled() -> Self {
        Self::new("/").without_storage()
    }

    pub fn with_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn without_storage(mut self) -> Self {
        self.storage = None;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_network(mut self, network: NetworkStatus) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HostEnvironment for StaticEnvironment {
    fn session_storage(&self) -> Option<Arc<dyn SessionStorage>> {
        self.storage.clone()
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn network(&self) -> Option<NetworkStatus> {
        self.network.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}
