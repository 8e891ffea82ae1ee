//! Internal telemetry for the tracking engine.
//!
//! Counters live in-process and are reported through the health endpoint;
//! logs go through `tracing`.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
