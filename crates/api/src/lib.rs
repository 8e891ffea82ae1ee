//! HTTP API for the tracking engine: event ingest, analytics panel queries
//! and health probes.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
