//! Session identifiers.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::env::SessionStorage;

/// Storage key holding the session ID.
pub const SESSION_STORAGE_KEY: &str = "tracker_session_id";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Creates the session ID once per browsing context and returns the stored
/// one afterwards.
pub struct SessionIdentity {
    storage: Option<Arc<dyn SessionStorage>>,
}

impl SessionIdentity {
    pub fn new(storage: Option<Arc<dyn SessionStorage>>) -> Self {
        Self { storage }
    }

    /// Returns the stored session ID, creating and persisting one on first
    /// use. Empty when there is no storage.
    pub fn get_or_create(&self) -> String {
        let Some(storage) = &self.storage else {
            return String::new();
        };

        if let Some(id) = storage.get(SESSION_STORAGE_KEY).filter(|id| !id.is_empty()) {
            return id;
        }

        let id = generate_session_id(Utc::now());
        storage.set(SESSION_STORAGE_KEY, &id);
        debug!(session_id = %id, "Created session");
        id
    }
}

/// `session_{unix_millis}_{9 lowercase alphanumerics}`.
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(9);
    for _ in 0..9 {
        suffix.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    format!("session_{}_{}", now.timestamp_millis(), suffix)
}
