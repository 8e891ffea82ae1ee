//! Single-value metric panels.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracking_core::EventRecord;

use crate::numeric::numeric_value;

/// Text shown for a metric that has no meaningful value.
pub const NOT_APPLICABLE: &str = "N/A";

/// Metric reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Count,
    Avg,
    Sum,
    Property,
    /// Any reduction this engine does not know
    #[serde(other)]
    Unsupported,
}

/// Result of a metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Count(u64),
    /// Average or sum, displayed with two decimals
    Number(f64),
    /// Raw property value
    Property(Value),
    NotApplicable,
}

impl MetricValue {
    /// Display form: counts as integers, numbers with two decimals.
    pub fn display(&self) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::Number(n) => format!("{:.2}", n),
            Self::Property(Value::String(s)) => s.clone(),
            Self::Property(v) => v.to_string(),
            Self::NotApplicable => NOT_APPLICABLE.to_string(),
        }
    }
}

/// Computes a metric over `rows`.
///
/// `avg`, `sum` and `property` need a property name; without one the
/// result is not applicable.
pub fn compute_metric(kind: MetricKind, property: Option<&str>, rows: &[EventRecord]) -> MetricValue {
    let property = property.filter(|p| !p.trim().is_empty());

    match (kind, property) {
        (MetricKind::Count, _) => MetricValue::Count(rows.len() as u64),
        (MetricKind::Unsupported, _) => MetricValue::NotApplicable,
        (_, None) => MetricValue::NotApplicable,
        (MetricKind::Property, Some(name)) => rows
            .iter()
            .filter_map(|r| r.property(name))
            .find(|v| !v.is_null())
            .map(|v| MetricValue::Property(v.clone()))
            .unwrap_or(MetricValue::NotApplicable),
        // Float `sum()` of nothing is -0.0
        (MetricKind::Sum, Some(name)) => {
            MetricValue::Number(numeric_values(rows, name).fold(0.0, |acc, v| acc + v))
        }
        (MetricKind::Avg, Some(name)) => {
            let (sum, count) = numeric_values(rows, name).fold((0.0, 0u64), |(s, c), v| (s + v, c + 1));
            if count == 0 {
                MetricValue::NotApplicable
            } else {
                MetricValue::Number(sum / count as f64)
            }
        }
    }
}

fn numeric_values<'a>(rows: &'a [EventRecord], name: &'a str) -> impl Iterator<Item = f64> + 'a {
    rows.iter()
        .filter_map(move |r| r.property(name))
        .filter_map(numeric_value)
}
