//! Current and previous page tracking.

use parking_lot::RwLock;
use tracing::debug;
use tracking_core::naming::page_name_of;

/// Host lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    /// Push, replace or pop navigation to a new location
    Navigated(String),
    Hidden,
    Visible,
    Unload,
}

/// Page identity at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub current_page: String,
    /// Previous page, absent on the first page of the session
    pub refer_page: Option<String>,
    pub url: String,
}

/// Canonical current/previous page names, updated on navigation.
#[derive(Debug)]
pub struct PageIdentity {
    state: RwLock<PageSnapshot>,
}

impl PageIdentity {
    pub fn new(location: &str) -> Self {
        Self {
            state: RwLock::new(PageSnapshot {
                current_page: page_name_of(location),
                refer_page: None,
                url: location.to_string(),
            }),
        }
    }

    /// Applies a navigation. Returns whether the page changed; a change
    /// limited to the query string only updates the URL.
    pub fn navigate(&self, location: &str) -> bool {
        let page = page_name_of(location);
        let mut state = self.state.write();
        state.url = location.to_string();

        if page == state.current_page {
            return false;
        }

        let previous = std::mem::replace(&mut state.current_page, page);
        debug!(from = %previous, to = %state.current_page, "Page changed");
        state.refer_page = Some(previous);
        true
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.state.read().clone()
    }

    pub fn current_page(&self) -> String {
        self.state.read().current_page.clone()
    }
}
