//! The tracker façade.
//!
//! ```ignore
//! let tracker = Tracker::init(options, env, transport);
//! tracker.page().view(None);
//! tracker.button().name("Signup").click(None);
//! tracker.element().name("Hero").disappear(12, None);
//! tracker.shutdown().await;
//! ```
//!
//! `Tracker::connect` builds the HTTP transport from `TrackerOptions::base_url`.
//! Apart from that constructor, no method returns an error or panics. When the host has no session
//! storage the tracker is disabled and every call is a no-op.

use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracking_core::{DeviceInfo, EventType, Properties, Result, TrackingEvent};

use crate::builder::{EventBuilder, EventContext};
use crate::config::{TrackerConfig, TrackerOptions};
use crate::env::HostEnvironment;
use crate::page::{HostSignal, PageIdentity};
use crate::queue::{DeliveryQueue, FlushTrigger};
use crate::session::SessionIdentity;
use crate::transport::{EventTransport, HttpTransport};

struct Inner {
    session_id: String,
    config: RwLock<TrackerConfig>,
    page: PageIdentity,
    device: DeviceInfo,
    env: Arc<dyn HostEnvironment>,
    queue: Arc<DeliveryQueue>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Inner {
    fn builder(&self) -> EventBuilder {
        let config = self.config.read();
        EventBuilder::new(EventContext {
            session_id: self.session_id.clone(),
            user_id: config.user_id.clone(),
            company_id: config.company_id.clone(),
            page: self.page.snapshot(),
            device: self.device.clone(),
            page_title: self.env.title(),
            viewport: self.env.viewport(),
        })
    }

    fn enqueue(&self, event: TrackingEvent) {
        debug!(event_name = %event.event_name, "Tracked");
        self.queue.enqueue(event);
    }
}

/// Interaction tracker for one browsing context.
///
/// Cheap to clone; clones share session, page identity and queue.
#[derive(Clone)]
pub struct Tracker {
    inner: Option<Arc<Inner>>,
}

impl Tracker {
    /// Creates a tracker and, inside a tokio runtime, starts its flush timer.
    pub fn init(
        options: TrackerOptions,
        env: Arc<dyn HostEnvironment>,
        transport: Arc<dyn EventTransport>,
    ) -> Self {
        let session_id = SessionIdentity::new(env.session_storage()).get_or_create();
        if session_id.is_empty() {
            debug!("No session storage available, tracking disabled");
            return Self::disabled();
        }

        let user_agent = env.user_agent();
        let network = env.network();
        let device = DeviceInfo::detect(user_agent.as_deref(), network.as_ref());
        let queue = Arc::new(DeliveryQueue::new(
            transport,
            options.config.api_endpoint(),
            options.queue,
        ));

        let mut tasks = Vec::new();
        if tokio::runtime::Handle::try_current().is_ok() {
            tasks.push(queue.clone().start_flush_task());
        } else {
            debug!("No tokio runtime, timer flush disabled");
        }

        info!(
            session_id = %session_id,
            device_type = %device.device_type,
            browser = %device.browser,
            "Tracker initialized"
        );

        Self {
            inner: Some(Arc::new(Inner {
                session_id,
                config: RwLock::new(options.config),
                page: PageIdentity::new(&env.location()),
                device,
                env,
                queue,
                tasks: Mutex::new(tasks),
            })),
        }
    }

    /// Creates a tracker delivering over HTTP to `options.base_url`.
    ///
    /// Fails only when the base URL cannot be parsed or the HTTP client
    /// cannot be built.
    pub fn connect(options: TrackerOptions, env: Arc<dyn HostEnvironment>) -> Result<Self> {
        let transport = HttpTransport::new(&options.base_url)?;
        debug!(base_url = %options.base_url, "HTTP transport ready");
        Ok(Self::init(options, env, Arc::new(transport)))
    }

    /// A tracker that does nothing.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Session ID, empty when disabled.
    pub fn session_id(&self) -> &str {
        self.inner.as_ref().map(|i| i.session_id.as_str()).unwrap_or("")
    }

    /// Shallow-merges `update` into the current configuration.
    pub fn configure(&self, update: TrackerConfig) {
        let Some(inner) = &self.inner else { return };
        let mut config = inner.config.write();
        config.merge(update);
        inner.queue.set_endpoint(config.api_endpoint());
        debug!(endpoint = config.api_endpoint(), "Tracker reconfigured");
    }

    pub fn config(&self) -> TrackerConfig {
        self.inner
            .as_ref()
            .map(|i| i.config.read().clone())
            .unwrap_or_default()
    }

    /// Records a navigation to `location`.
    pub fn navigate(&self, location: &str) {
        if let Some(inner) = &self.inner {
            inner.page.navigate(location);
        }
    }

    /// Canonical name of the current page, empty when disabled.
    pub fn current_page(&self) -> String {
        self.inner
            .as_ref()
            .map(|i| i.page.current_page())
            .unwrap_or_default()
    }

    /// Applies a host lifecycle signal. Hidden and unload flush the queue.
    pub async fn handle_signal(&self, signal: HostSignal) {
        let Some(inner) = &self.inner else { return };
        match signal {
            HostSignal::Navigated(location) => {
                inner.page.navigate(&location);
            }
            HostSignal::Hidden => {
                inner.queue.flush_with(FlushTrigger::Hidden).await;
            }
            HostSignal::Unload => {
                inner.queue.flush_with(FlushTrigger::Unload).await;
            }
            HostSignal::Visible => {}
        }
    }

    /// Spawns a listener applying every signal received on `signals`.
    pub fn attach(&self, mut signals: mpsc::Receiver<HostSignal>) {
        let Some(inner) = &self.inner else { return };
        let weak: Weak<Inner> = Arc::downgrade(inner);

        let handle = tokio::spawn(async move {
            while let Some(signal) = signals.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                Tracker { inner: Some(inner) }.handle_signal(signal).await;
            }
            debug!("Host signal channel closed");
        });
        inner.tasks.lock().push(handle);
    }

    pub fn page(&self) -> PageBuilder<'_> {
        PageBuilder {
            tracker: self,
            name: None,
        }
    }

    pub fn button(&self) -> ButtonBuilder<'_> {
        ButtonBuilder {
            tracker: self,
            name: None,
        }
    }

    pub fn element(&self) -> ElementBuilder<'_> {
        ElementBuilder {
            tracker: self,
            name: None,
        }
    }

    /// Records an event with a caller-chosen name on the current page.
    pub fn track(&self, event_type: EventType, event_name: &str, properties: Option<Properties>) {
        if let Some(inner) = &self.inner {
            inner.enqueue(inner.builder().build_raw(event_type, event_name, properties));
        }
    }

    pub async fn flush(&self) {
        if let Some(inner) = &self.inner {
            inner.queue.flush().await;
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.as_ref().map(|i| i.queue.pending()).unwrap_or(0)
    }

    pub fn pending_events(&self) -> Vec<TrackingEvent> {
        self.inner
            .as_ref()
            .map(|i| i.queue.pending_events())
            .unwrap_or_default()
    }

    /// Stops the timer and signal listener, then flushes what is left.
    pub async fn shutdown(&self) {
        let Some(inner) = &self.inner else { return };
        let tasks = std::mem::take(&mut *inner.tasks.lock());
        for task in tasks {
            task.abort();
        }
        inner.queue.flush_with(FlushTrigger::Unload).await;
        info!(pending = inner.queue.pending(), "Tracker shut down");
    }

    fn record(&self, f: impl FnOnce(&EventBuilder) -> TrackingEvent) {
        if let Some(inner) = &self.inner {
            inner.enqueue(f(&inner.builder()));
        }
    }
}

/// `tracker.page()`
pub struct PageBuilder<'a> {
    tracker: &'a Tracker,
    name: Option<String>,
}

impl PageBuilder<'_> {
    /// Overrides the page the view is attributed to.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn view(self, properties: Option<Properties>) {
        self.tracker.record(|b| match &self.name {
            Some(name) => b.build_view_of(name, properties),
            None => b.build(EventType::View, None, properties),
        });
    }
}

/// `tracker.button()`
pub struct ButtonBuilder<'a> {
    tracker: &'a Tracker,
    name: Option<String>,
}

impl ButtonBuilder<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn click(self, properties: Option<Properties>) {
        self.tracker
            .record(|b| b.build(EventType::Click, self.name.as_deref(), properties));
    }
}

/// `tracker.element()`
pub struct ElementBuilder<'a> {
    tracker: &'a Tracker,
    name: Option<String>,
}

impl ElementBuilder<'_> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn expose(self, properties: Option<Properties>) {
        self.tracker
            .record(|b| b.build(EventType::Expose, self.name.as_deref(), properties));
    }

    /// `expose_time` is the number of seconds the element was visible.
    pub fn disappear(self, expose_time: u64, properties: Option<Properties>) {
        self.tracker
            .record(|b| b.build_disappear(self.name.as_deref(), expose_time, properties));
    }
}
