//! Interaction tracking engine server.
//!
//! Serves the SDK ingest endpoint (`POST /api/track`), the analytics panel
//! queries and health probes over an in-memory event store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{info, warn};

use api::{router, AppState};
use event_store::{EventStore, MemoryStore, StoreConfig};
use telemetry::{health, init_tracing_from_env, metrics};
use tracking_core::limits::MAX_BATCH_EVENTS;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IngestConfig {
    /// Per-request event cap
    #[serde(default = "default_max_batch_events")]
    max_batch_events: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_batch_events() -> usize {
    MAX_BATCH_EVENTS
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_batch_events: default_max_batch_events(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting tracking engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        max_events = ?config.store.max_events,
        max_batch_events = config.ingest.max_batch_events,
        "Loaded configuration"
    );

    let store = Arc::new(MemoryStore::new(config.store.clone()));
    if store.is_healthy() {
        health().store.set_healthy();
    } else {
        health().store.set_unhealthy("store unavailable at startup");
        warn!("Event store reported unhealthy at startup");
    }

    let state = AppState::new(store.clone()).with_max_batch_events(config.ingest.max_batch_events);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let snapshot = metrics().snapshot();
    info!(
        events_stored = snapshot.events_stored,
        events_rejected = snapshot.events_rejected,
        sessions_upserted = snapshot.sessions_upserted,
        stored_now = store.len(),
        "Shutdown complete"
    );
    Ok(())
}

/// Load configuration from defaults, `config/default.toml` and
/// `TRACKING__*` environment variables.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::with_prefix("TRACKING")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
