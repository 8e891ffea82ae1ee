//! Read-side aggregation for tracked events.
//!
//! Every computation is a pure function over a slice of [`EventRecord`]s;
//! [`AnalyticsService`] fetches the slice from an [`event_store::EventStore`]
//! and applies the panel time-range and filter conventions.
//!
//! [`EventRecord`]: tracking_core::EventRecord

pub mod bar;
pub mod filter;
pub mod funnel;
pub mod metric;
pub mod numeric;
pub mod service;
pub mod trend;

pub use bar::{bar_distribution, sorted_desc, BarEntry};
pub use filter::{PanelFilter, TimeRange};
pub use funnel::{funnel, CountMode, FunnelConfig, FunnelStep};
pub use metric::{compute_metric, MetricKind, MetricValue};
pub use service::*;
pub use trend::{trend_series, Interval, TrendMetric, TrendPoint, TrendSeries};
