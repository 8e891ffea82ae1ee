//! Bar distributions: event counts per name.

use serde::{Deserialize, Serialize};
use tracking_core::EventRecord;

/// One bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarEntry {
    pub name: String,
    pub count: u64,
}

/// Counts rows per event name.
///
/// With explicit `names`, one entry per requested name in requested order
/// (zero if absent). Otherwise one entry per distinct name in order of first
/// appearance. Blank requested names are ignored.
pub fn bar_distribution(names: &[String], rows: &[EventRecord]) -> Vec<BarEntry> {
    let requested: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !n.trim().is_empty())
        .collect();

    if !requested.is_empty() {
        return requested
            .into_iter()
            .map(|name| BarEntry {
                name: name.to_string(),
                count: rows.iter().filter(|r| r.event_name == name).count() as u64,
            })
            .collect();
    }

    let mut entries: Vec<BarEntry> = Vec::new();
    for record in rows {
        match entries.iter_mut().find(|e| e.name == record.event_name) {
            Some(entry) => entry.count += 1,
            None => entries.push(BarEntry {
                name: record.event_name.clone(),
                count: 1,
            }),
        }
    }
    entries
}

/// Orders entries by count, largest first. Ties keep their order.
pub fn sorted_desc(mut entries: Vec<BarEntry>) -> Vec<BarEntry> {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
