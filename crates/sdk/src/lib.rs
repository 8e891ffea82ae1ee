//! Client-side interaction tracker.
//!
//! A [`Tracker`] builds [`TrackingEvent`]s from chained calls such as
//! `tracker.button().name("Signup").click(None)`, buffers them in a
//! [`DeliveryQueue`] and delivers them in batches through an
//! [`EventTransport`]. Nothing here returns an error to the caller: delivery
//! failures are logged, counted and retried on the next flush.
//!
//! [`TrackingEvent`]: tracking_core::TrackingEvent

pub mod builder;
pub mod config;
pub mod env;
pub mod page;
pub mod queue;
pub mod session;
pub mod tracker;
pub mod transport;

pub use builder::{EventBuilder, EventContext};
pub use config::*;
pub use env::{HostEnvironment, MemoryStorage, SessionStorage, StaticEnvironment};
pub use page::{HostSignal, PageIdentity, PageSnapshot};
pub use queue::{DeliveryQueue, FlushTrigger};
pub use session::SessionIdentity;
pub use tracker::{ButtonBuilder, ElementBuilder, PageBuilder, Tracker};
pub use transport::{EventTransport, HttpTransport};
