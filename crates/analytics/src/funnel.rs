//! Referrer-aware conversion funnels.
//!
//! Events are partitioned by identity (user ID, else session ID). An
//! identity reaches step `i > 0` only through step `i - 1`: it needs a step
//! `i - 1` event, and its step `i` events count only when they happen
//! strictly after the earliest step `i - 1` event, within the time window,
//! and were referred from step `i - 1`'s page.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracking_core::naming::page_of_step;
use tracking_core::EventRecord;

/// How qualifying identities are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMode {
    /// Each identity counts once per step
    #[default]
    Unique,
    /// Every qualifying event counts
    Total,
}

fn default_time_window() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

/// Funnel definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelConfig {
    /// Ordered step event names
    #[serde(default)]
    pub steps: Vec<String>,
    /// Window in days after the previous step's anchor
    #[serde(default = "default_time_window")]
    pub time_window: u32,
    #[serde(default)]
    pub count_mode: CountMode,
    /// Accept step events without a `refer`, as recorded before referrers
    /// were tracked.
    #[serde(default = "default_true")]
    pub accept_missing_refer: bool,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            time_window: default_time_window(),
            count_mode: CountMode::default(),
            accept_missing_refer: default_true(),
        }
    }
}

impl FunnelConfig {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_time_window(mut self, days: u32) -> Self {
        self.time_window = days;
        self
    }

    pub fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    pub fn with_accept_missing_refer(mut self, accept: bool) -> Self {
        self.accept_missing_refer = accept;
        self
    }
}

/// One funnel row. `rate` is a percentage of the first step's count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStep {
    pub step: String,
    pub count: u64,
    pub rate: f64,
}

/// Computes the funnel over `rows`. Row order does not matter.
pub fn funnel(config: &FunnelConfig, rows: &[EventRecord]) -> Vec<FunnelStep> {
    if config.steps.is_empty() {
        return Vec::new();
    }

    let mut by_identity: HashMap<&str, Vec<&EventRecord>> = HashMap::new();
    for record in rows {
        by_identity.entry(record.identity()).or_default().push(record);
    }

    let window = Duration::days(i64::from(config.time_window));

    let counts: Vec<u64> = config
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            by_identity
                .values()
                .map(|events| {
                    let matches = if i == 0 {
                        events.iter().filter(|e| e.event_name == *step).count()
                    } else {
                        let prev = &config.steps[i - 1];
                        valid_step_events(events, prev, step, window, config.accept_missing_refer)
                    };
                    match (matches, config.count_mode) {
                        (0, _) => 0,
                        (_, CountMode::Unique) => 1,
                        (n, CountMode::Total) => n as u64,
                    }
                })
                .sum()
        })
        .collect();

    let first = counts[0];
    config
        .steps
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(i, (step, count))| {
            let rate = if i == 0 {
                100.0
            } else if first == 0 {
                0.0
            } else {
                count as f64 / first as f64 * 100.0
            };
            FunnelStep {
                step: step.clone(),
                count,
                rate,
            }
        })
        .collect()
}

/// Number of `step` events of one identity that follow its `prev` anchor.
fn valid_step_events(
    events: &[&EventRecord],
    prev: &str,
    step: &str,
    window: Duration,
    accept_missing_refer: bool,
) -> usize {
    let anchor: Option<DateTime<Utc>> = events
        .iter()
        .filter(|e| e.event_name == prev)
        .map(|e| e.timestamp)
        .min();

    let Some(anchor) = anchor else {
        return 0;
    };
    let prev_page = page_of_step(prev);

    events
        .iter()
        .filter(|e| e.event_name == step)
        .filter(|e| e.timestamp > anchor && e.timestamp - anchor <= window)
        .filter(|e| match e.refer.as_deref() {
            Some(refer) if !refer.is_empty() => refer == prev_page,
            _ => accept_missing_refer,
        })
        .count()
}
