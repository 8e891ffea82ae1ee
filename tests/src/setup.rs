//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use event_store::EventStore;
use std::sync::Arc;
use tracker_sdk::{EventTransport, StaticEnvironment, Tracker, TrackerOptions};

use crate::fixtures::CHROME_MAC;
use crate::mocks::{MockStore, RouterTransport};

/// The real router over a [`MockStore`].
pub struct TestContext {
    pub store: Arc<MockStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_state(|state| state)
    }

    /// Context whose [`AppState`] is adjusted by `f` before routing.
    pub fn with_state(f: impl FnOnce(AppState) -> AppState) -> Self {
        let store = Arc::new(MockStore::new());
        let state = f(AppState::new(store.clone() as Arc<dyn EventStore>));

        Self {
            store,
            router: router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// A tracker at `location` delivering straight into this router.
    pub fn tracker(&self, location: &str) -> Tracker {
        let env = StaticEnvironment::new(location)
            .with_user_agent(CHROME_MAC)
            .with_title("Test")
            .with_viewport(1280, 720);
        let transport: Arc<dyn EventTransport> = Arc::new(RouterTransport::new(self.router.clone()));
        Tracker::init(TrackerOptions::default(), Arc::new(env), transport)
    }

    /// Number of events in the store.
    pub fn stored_events(&self) -> usize {
        self.store.memory().len()
    }

    /// Set the store to fail (for error testing).
    pub fn set_store_failure(&self, should_fail: bool) {
        self.store.set_should_fail(should_fail);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
