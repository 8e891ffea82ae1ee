//! Panel queries over an event store.

use chrono::Utc;
use event_store::{EventFilter, EventStore, Overview};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::debug;
use tracking_core::{EventRecord, Result};

use crate::bar::{bar_distribution, BarEntry};
use crate::filter::{PanelFilter, TimeRange};
use crate::funnel::{funnel, FunnelConfig, FunnelStep};
use crate::metric::{compute_metric, MetricKind, MetricValue};
use crate::trend::{trend_series, Interval, TrendMetric, TrendSeries};

/// Metric panel query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    #[serde(default)]
    pub metric: MetricKind,
    /// Restricts rows to one event name; all events when absent
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub filter: PanelFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub value: MetricValue,
    pub display: String,
}

/// Bar panel query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarQuery {
    #[serde(default)]
    pub event_names: Vec<String>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub filter: PanelFilter,
}

/// Trend panel query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendQuery {
    #[serde(default)]
    pub event_names: Vec<String>,
    #[serde(default)]
    pub interval: Interval,
    #[serde(default)]
    pub metric_type: TrendMetric,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub filter: PanelFilter,
}

/// Funnel panel query. Funnels span the whole log unless a time range is
/// given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelQuery {
    #[serde(flatten)]
    pub config: FunnelConfig,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub filter: PanelFilter,
}

/// Runs panel queries against an [`EventStore`].
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn EventStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn metric(&self, query: &MetricQuery) -> Result<MetricResult> {
        let mut filter = self.range_filter(Some(query.time_range), &query.filter);
        if let Some(name) = query.event_name.as_deref().filter(|n| !n.trim().is_empty()) {
            filter = filter.event_name(name);
        }

        let rows = self.fetch("metric", &filter).await?;
        let value = compute_metric(query.metric, query.property_name.as_deref(), &rows);

        Ok(MetricResult {
            display: value.display(),
            value,
        })
    }

    pub async fn bar(&self, query: &BarQuery) -> Result<Vec<BarEntry>> {
        let filter = self.range_filter(Some(query.time_range), &query.filter);
        let rows = self.fetch("bar", &filter).await?;
        Ok(bar_distribution(&query.event_names, &rows))
    }

    pub async fn trend(&self, query: &TrendQuery) -> Result<Vec<TrendSeries>> {
        let filter = self.range_filter(Some(query.time_range), &query.filter);
        let rows = self.fetch("trend", &filter).await?;
        Ok(trend_series(
            &rows,
            &query.event_names,
            query.interval,
            query.metric_type,
            query.property_name.as_deref(),
        ))
    }

    pub async fn funnel(&self, query: &FunnelQuery) -> Result<Vec<FunnelStep>> {
        if query.config.steps.is_empty() {
            return Ok(Vec::new());
        }

        let filter = self
            .range_filter(query.time_range, &query.filter)
            .event_names(query.config.steps.iter().cloned());
        let rows = self.fetch("funnel", &filter).await?;
        Ok(funnel(&query.config, &rows))
    }

    pub async fn overview(&self) -> Result<Overview> {
        self.store.overview().await
    }

    fn range_filter(&self, range: Option<TimeRange>, panel: &PanelFilter) -> EventFilter {
        let mut filter = EventFilter::new();
        if let Some(range) = range {
            filter = filter.since(range.since(Utc::now()));
        }
        panel.apply(filter)
    }

    async fn fetch(&self, panel: &'static str, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let start = Instant::now();
        let rows = self.store.query_events(filter).await?;
        metrics().query_latency_ms.observe_duration(start.elapsed());

        debug!(panel, rows = rows.len(), "Fetched panel rows");
        Ok(rows)
    }
}
