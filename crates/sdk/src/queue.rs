//! Buffered, retrying event delivery.
//!
//! Events are appended to a FIFO buffer and delivered as one batch per
//! flush. A flush snapshots and clears the buffer in one critical section,
//! sends the snapshot, and on failure puts it back in front of anything
//! enqueued while the send was in flight. Delivery is at-least-once.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use telemetry::metrics;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};
use tracking_core::TrackingEvent;

use crate::config::QueueConfig;
use crate::transport::EventTransport;

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Caller asked for it
    Explicit,
    /// Repeating flush timer
    Timer,
    /// Host became hidden
    Hidden,
    /// Host is unloading
    Unload,
}

impl FlushTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Timer => "timer",
            Self::Hidden => "hidden",
            Self::Unload => "unload",
        }
    }
}

/// Ordered delivery buffer in front of an [`EventTransport`].
pub struct DeliveryQueue {
    buffer: Mutex<VecDeque<TrackingEvent>>,
    transport: Arc<dyn EventTransport>,
    endpoint: RwLock<String>,
    config: QueueConfig,
    /// Consecutive failed flushes
    failures: AtomicU32,
    /// Timer flushes are skipped until this instant
    backoff_until: Mutex<Option<Instant>>,
}

impl DeliveryQueue {
    pub fn new(
        transport: Arc<dyn EventTransport>,
        endpoint: impl Into<String>,
        config: QueueConfig,
    ) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::new()),
            transport,
            endpoint: RwLock::new(endpoint.into()),
            config,
            failures: AtomicU32::new(0),
            backoff_until: Mutex::new(None),
        }
    }

    /// Changes the endpoint used by subsequent flushes.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) {
        *self.endpoint.write() = endpoint.into();
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.read().clone()
    }

    /// Appends an event. When a buffer bound is configured the oldest
    /// events are dropped to make room.
    pub fn enqueue(&self, event: TrackingEvent) {
        let depth = {
            let mut buffer = self.buffer.lock();
            buffer.push_back(event);
            self.enforce_bound(&mut buffer);
            buffer.len()
        };

        metrics().events_enqueued.inc();
        metrics().queue_depth.set(depth as u64);
        debug!(depth, "Event enqueued");
    }

    /// Number of buffered events.
    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Copy of the buffered events in delivery order.
    pub fn pending_events(&self) -> Vec<TrackingEvent> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Consecutive failed flushes since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    pub async fn flush(&self) {
        self.flush_with(FlushTrigger::Explicit).await;
    }

    /// Delivers everything currently buffered as one batch.
    ///
    /// Returns `false` when the attempt failed and the batch was put back.
    /// An empty buffer is a successful no-op.
    pub async fn flush_with(&self, trigger: FlushTrigger) -> bool {
        let batch: Vec<TrackingEvent> = {
            let mut buffer = self.buffer.lock();
            std::mem::take(&mut *buffer).into()
        };

        if batch.is_empty() {
            return true;
        }

        let endpoint = self.endpoint();
        let count = batch.len();
        metrics().flushes_attempted.inc();
        metrics().queue_depth.set(self.pending() as u64);
        debug!(trigger = trigger.as_str(), count, endpoint = %endpoint, "Flushing events");

        let start = std::time::Instant::now();
        match self.transport.send(&endpoint, &batch).await {
            Ok(()) => {
                metrics().delivery_latency_ms.observe_duration(start.elapsed());
                metrics().events_delivered.inc_by(count as u64);
                self.failures.store(0, Ordering::Relaxed);
                *self.backoff_until.lock() = None;
                debug!(count, "Batch delivered");
                true
            }
            Err(e) => {
                metrics().flush_failures.inc();
                let depth = self.requeue(batch);
                metrics().queue_depth.set(depth as u64);

                let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(delay) = self.config.backoff(failures) {
                    *self.backoff_until.lock() = Some(Instant::now() + delay);
                }
                warn!(
                    trigger = trigger.as_str(),
                    count,
                    failures,
                    error = %e,
                    "Batch delivery failed, events re-queued"
                );
                false
            }
        }
    }

    /// Puts a failed batch back ahead of anything enqueued meanwhile.
    fn requeue(&self, batch: Vec<TrackingEvent>) -> usize {
        let mut buffer = self.buffer.lock();
        for event in batch.into_iter().rev() {
            buffer.push_front(event);
        }
        self.enforce_bound(&mut buffer);
        buffer.len()
    }

    fn enforce_bound(&self, buffer: &mut VecDeque<TrackingEvent>) {
        let Some(max) = self.config.max_buffer else {
            return;
        };
        let excess = buffer.len().saturating_sub(max);
        if excess > 0 {
            buffer.drain(..excess);
            metrics().events_dropped.inc_by(excess as u64);
            warn!(dropped = excess, max_buffer = max, "Buffer full, dropped oldest events");
        }
    }

    fn in_backoff(&self) -> bool {
        matches!(*self.backoff_until.lock(), Some(until) if Instant::now() < until)
    }

    /// Starts the repeating timer flush. The first flush happens one full
    /// interval after start; ticks with an empty buffer or inside a backoff
    /// window do nothing. The task holds the queue weakly and ends once the
    /// last owner drops it.
    pub fn start_flush_task(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config.flush_interval();
        let weak: Weak<Self> = Arc::downgrade(&self);
        drop(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let Some(queue) = weak.upgrade() else { break };
                if queue.pending() == 0 {
                    continue;
                }
                if queue.in_backoff() {
                    debug!(failures = queue.consecutive_failures(), "Timer flush skipped, backing off");
                    continue;
                }
                queue.flush_with(FlushTrigger::Timer).await;
            }
            debug!("Delivery queue dropped, timer flush stopped");
        })
    }
}
