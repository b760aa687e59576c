// Counters read out of a network's fetched `activity` map.
//
// Series entries look like `{ "sum": N, "insight_type": "...", ... }` for
// insights and `{ "sum": N, "type": "download" | "upload", ... }` for
// data usage; per-resource lists also carry `url` or `insights_url`.

use serde::Serialize;
use serde_json::Value;

use crate::activity::Activity;

use super::raw::{at, list_at, str_at, u64_at};

/// Download/upload totals for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataUsage {
    pub download: Option<u64>,
    pub upload: Option<u64>,
}

impl DataUsage {
    pub fn total(&self) -> Option<u64> {
        match (self.download, self.upload) {
            (None, None) => None,
            (down, up) => Some(down.unwrap_or(0) + up.unwrap_or(0)),
        }
    }
}

/// Blocked-threat counters broken down by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockedCounts {
    pub blocked: Option<u64>,
    pub botnet: Option<u64>,
    pub domains: Option<u64>,
    pub malware: Option<u64>,
    pub parked: Option<u64>,
    pub phishing: Option<u64>,
    pub spyware: Option<u64>,
}

/// Series stored for `scope` and `activity` on a network's raw data.
pub(crate) fn series<'a>(network: &'a Value, scope: &str, activity: Activity) -> Option<&'a Value> {
    at(network, &["activity", scope, activity.key()])
}

/// `sum` of the first entry whose `key` equals `expected`.
pub(crate) fn sum_where(entries: &[Value], key: &str, expected: &str) -> Option<u64> {
    entries
        .iter()
        .find(|entry| str_at(entry, &[key]) == Some(expected))
        .and_then(|entry| u64_at(entry, &["sum"]))
}

/// Download/upload from entries tagged by `type`.
pub(crate) fn usage_by_type(entries: &[Value]) -> DataUsage {
    let mut usage = DataUsage::default();
    for entry in entries {
        match str_at(entry, &["type"]) {
            Some("download") => usage.download = u64_at(entry, &["sum"]),
            Some("upload") => usage.upload = u64_at(entry, &["sum"]),
            _ => {}
        }
    }
    usage
}

/// Download/upload of the entry whose `url` equals `url`.
pub(crate) fn usage_by_url(entries: &[Value], url: &str) -> DataUsage {
    entries
        .iter()
        .find(|entry| str_at(entry, &["url"]) == Some(url))
        .map_or_else(DataUsage::default, |entry| DataUsage {
            download: u64_at(entry, &["download"]),
            upload: u64_at(entry, &["upload"]),
        })
}

/// Per-category blocked counts from entries tagged by `insight_type`.
pub(crate) fn blocked_counts(entries: &[Value]) -> BlockedCounts {
    let sum = |kind| sum_where(entries, "insight_type", kind);
    BlockedCounts {
        blocked: sum("blocked"),
        botnet: sum("botnet"),
        domains: sum("domains"),
        malware: sum("malware"),
        parked: sum("parked"),
        phishing: sum("phishing"),
        spyware: sum("spyware"),
    }
}

/// Entries of a series value, whether stored as a list or missing.
pub(crate) fn entries(value: Option<&Value>) -> &[Value] {
    value.map_or(&[][..], |v| list_at(v, &[]))
}
