//! Core types, naming rules and validation for the interaction tracking engine.

pub mod device;
pub mod error;
pub mod events;
pub mod limits;
pub mod naming;
pub mod record;
pub mod session;

pub use device::{DeviceInfo, NetworkStatus};
pub use error::{Error, Result};
pub use events::*;
pub use record::{transform_batch, validate_event, EventRecord, TrackPayload};
pub use session::SessionAggregate;
