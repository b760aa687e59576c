use serde_json::Value;

use super::raw::{list_at, str_at};

/// One entry of a firmware release-notes manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Firmware<'a> {
    data: Option<&'a Value>,
}

impl<'a> Firmware<'a> {
    pub(crate) fn new(data: Option<&'a Value>) -> Self {
        Self { data }
    }

    /// `true` when no release-notes entry backs this view.
    pub fn is_unknown(&self) -> bool {
        self.data.is_none_or(|d| !d.is_object())
    }

    pub fn os_version(&self) -> Option<&'a str> {
        self.data.and_then(|d| str_at(d, &["os_version"]))
    }

    pub fn release_date(&self) -> Option<&'a str> {
        self.data.and_then(|d| str_at(d, &["release_date"]))
    }

    pub fn title(&self) -> Option<&'a str> {
        self.data.and_then(|d| str_at(d, &["title"]))
    }

    pub fn features(&self) -> Vec<&'a str> {
        self.data
            .map(|d| list_at(d, &["features"]).iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
