//! In-process metrics collection.
//!
//! The SDK and the server share one registry shape; each side only touches
//! its own counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds. Values above the last bound land in
    /// the last bucket.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    /// Records an elapsed duration.
    pub fn observe_duration(&self, elapsed: Duration) {
        self.observe(elapsed.as_millis().min(u64::MAX as u128) as u64);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns `(upper bound, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the tracker and the ingest server.
#[derive(Debug, Default)]
pub struct Metrics {
    // Tracker delivery
    pub events_enqueued: Counter,
    pub events_dropped: Counter,
    pub flushes_attempted: Counter,
    pub flush_failures: Counter,
    pub events_delivered: Counter,
    pub queue_depth: Gauge,
    pub delivery_latency_ms: Histogram,

    // Ingest
    pub batches_received: Counter,
    pub events_received: Counter,
    pub events_stored: Counter,
    pub events_rejected: Counter,
    pub sessions_upserted: Counter,
    pub ingest_latency_ms: Histogram,

    // Analytics
    pub query_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_enqueued: self.events_enqueued.get(),
            events_dropped: self.events_dropped.get(),
            flushes_attempted: self.flushes_attempted.get(),
            flush_failures: self.flush_failures.get(),
            events_delivered: self.events_delivered.get(),
            queue_depth: self.queue_depth.get(),
            delivery_latency_mean_ms: self.delivery_latency_ms.mean(),
            batches_received: self.batches_received.get(),
            events_received: self.events_received.get(),
            events_stored: self.events_stored.get(),
            events_rejected: self.events_rejected.get(),
            sessions_upserted: self.sessions_upserted.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            query_latency_mean_ms: self.query_latency_ms.mean(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_enqueued: u64,
    pub events_dropped: u64,
    pub flushes_attempted: u64,
    pub flush_failures: u64,
    pub events_delivered: u64,
    pub queue_depth: u64,
    pub delivery_latency_mean_ms: f64,
    pub batches_received: u64,
    pub events_received: u64,
    pub events_stored: u64,
    pub events_rejected: u64,
    pub sessions_upserted: u64,
    pub ingest_latency_mean_ms: f64,
    pub query_latency_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
