//! Time-bucketed trend series.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracking_core::EventRecord;

use crate::numeric::numeric_value;

/// Series name used when no event names are requested.
pub const ALL_EVENTS: &str = "all";

/// Bucket width. Weeks start on Sunday 00:00 UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hour,
    #[default]
    Day,
    Week,
}

impl Interval {
    /// Start of the bucket containing `ts`.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let day = ts.date_naive();
        let start = match self {
            Self::Hour => day.and_hms_opt(ts.hour(), 0, 0),
            Self::Day => day.and_hms_opt(0, 0, 0),
            Self::Week => {
                let back = Duration::days(i64::from(ts.weekday().num_days_from_sunday()));
                (day - back).and_hms_opt(0, 0, 0)
            }
        };
        start.map(|naive| naive.and_utc()).unwrap_or(ts)
    }

    /// Display label of a bucket start, e.g. `1/5 14:00`, `1/5`, `Week of 1/5`.
    pub fn label(&self, start: DateTime<Utc>) -> String {
        match self {
            Self::Hour => format!("{}/{} {}:00", start.month(), start.day(), start.hour()),
            Self::Day => format!("{}/{}", start.month(), start.day()),
            Self::Week => format!("Week of {}/{}", start.month(), start.day()),
        }
    }
}

/// Per-bucket reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMetric {
    #[default]
    Count,
    Sum,
    Average,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub start: DateTime<Utc>,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub event_name: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Default)]
struct Bucket {
    rows: u64,
    numeric: u64,
    sum: f64,
}

/// Builds one series per requested event name, or a single `all` series
/// over every row when `names` is empty.
///
/// Buckets only exist where rows exist. A `sum`/`average` bucket whose rows
/// carry no numeric value reports 0.
pub fn trend_series(
    rows: &[EventRecord],
    names: &[String],
    interval: Interval,
    metric: TrendMetric,
    property: Option<&str>,
) -> Vec<TrendSeries> {
    let requested: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !n.trim().is_empty())
        .collect();

    if requested.is_empty() {
        return vec![series(ALL_EVENTS, rows.iter(), interval, metric, property)];
    }

    requested
        .into_iter()
        .map(|name| {
            let matching = rows.iter().filter(|r| r.event_name == name);
            series(name, matching, interval, metric, property)
        })
        .collect()
}

fn series<'a>(
    name: &str,
    rows: impl Iterator<Item = &'a EventRecord>,
    interval: Interval,
    metric: TrendMetric,
    property: Option<&str>,
) -> TrendSeries {
    let mut buckets: BTreeMap<DateTime<Utc>, Bucket> = BTreeMap::new();

    for record in rows {
        let bucket = buckets.entry(interval.bucket_start(record.timestamp)).or_default();
        bucket.rows += 1;

        if let Some(value) = property
            .and_then(|p| record.property(p))
            .and_then(numeric_value)
        {
            bucket.numeric += 1;
            bucket.sum += value;
        }
    }

    let points = buckets
        .into_iter()
        .map(|(start, bucket)| {
            let value = match metric {
                TrendMetric::Count => bucket.rows as f64,
                TrendMetric::Sum => bucket.sum,
                TrendMetric::Average if bucket.numeric > 0 => bucket.sum / bucket.numeric as f64,
                TrendMetric::Average => 0.0,
            };
            TrendPoint {
                start,
                label: interval.label(start),
                value,
            }
        })
        .collect();

    TrendSeries {
        event_name: name.to_string(),
        points,
    }
}
