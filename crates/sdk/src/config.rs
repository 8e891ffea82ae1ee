//! Tracker configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ingest path used when none is configured.
pub const DEFAULT_API_ENDPOINT: &str = "/api/track";

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Identity and endpoint settings, shallow-merged by `Tracker::configure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    /// Ingest endpoint, absolute or relative to the base URL
    #[serde(default)]
    pub api_endpoint: Option<String>,
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company_id = Some(company_id.into());
        self
    }

    pub fn with_api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// Fields set in `update` override; unset fields keep their value.
    pub fn merge(&mut self, update: TrackerConfig) {
        if update.user_id.is_some() {
            self.user_id = update.user_id;
        }
        if update.company_id.is_some() {
            self.company_id = update.company_id;
        }
        if update.api_endpoint.is_some() {
            self.api_endpoint = update.api_endpoint;
        }
    }

    pub fn api_endpoint(&self) -> &str {
        self.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }
}

/// Delivery queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Timer flush period in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Buffer bound; the oldest events are dropped beyond it. Unbounded
    /// when absent.
    #[serde(default)]
    pub max_buffer: Option<usize>,
    /// First backoff after a failed timer flush. No backoff when absent.
    #[serde(default)]
    pub initial_backoff_ms: Option<u64>,
    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_flush_interval_ms() -> u64 {
    15_000
}

fn default_max_backoff_ms() -> u64 {
    300_000
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: default_flush_interval_ms(),
            max_buffer: None,
            initial_backoff_ms: None,
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl QueueConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }

    /// Backoff after `failures` consecutive failed timer flushes, doubling
    /// from `initial_backoff_ms` up to `max_backoff_ms`.
    pub fn backoff(&self, failures: u32) -> Option<Duration> {
        let initial = self.initial_backoff_ms?;
        if failures == 0 {
            return None;
        }
        let factor = 1u64.checked_shl(failures - 1).unwrap_or(u64::MAX);
        let ms = initial.saturating_mul(factor).min(self.max_backoff_ms);
        Some(Duration::from_millis(ms))
    }
}

/// Everything `Tracker::init` needs besides the host and the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerOptions {
    #[serde(default)]
    pub config: TrackerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    /// Base URL relative endpoints resolve against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            config: TrackerConfig::default(),
            queue: QueueConfig::default(),
            base_url: default_base_url(),
        }
    }
}
