// ── Client view ──
//
// A device connected (now or previously) to a network. Profile membership
// lists reuse this view over the profile's embedded device entries.

use chrono::{DateTime, Utc};
use eerosync_api::Method;
use serde_json::{Value, json};

use crate::activity::Activity;
use crate::error::CoreError;

use super::category::DeviceCategory;
use super::insights::{self, DataUsage};
use super::issue;
use super::network::Network;
use super::raw::{at, bool_at, f64_at, i64_at, str_at, text_at, u64_at};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy)]
pub struct Client<'a> {
    network: Network<'a>,
    data: &'a Value,
}

impl<'a> Client<'a> {
    pub(crate) fn new(network: Network<'a>, data: &'a Value) -> Self {
        Self { network, data }
    }

    pub fn network(&self) -> Network<'a> {
        self.network
    }

    pub fn data(&self) -> &'a Value {
        self.data
    }

    pub fn url(&self) -> &'a str {
        str_at(self.data, &["url"]).unwrap_or_default()
    }

    pub fn id(&self) -> &'a str {
        let url = self.url();
        url.strip_prefix(self.network.url())
            .and_then(|rest| rest.strip_prefix("/devices/"))
            .unwrap_or(url)
    }

    // ── Naming ───────────────────────────────────────────────────────

    pub fn nickname(&self) -> Option<&'a str> {
        str_at(self.data, &["nickname"])
    }

    pub fn hostname(&self) -> Option<&'a str> {
        str_at(self.data, &["hostname"])
    }

    pub fn mac(&self) -> Option<&'a str> {
        str_at(self.data, &["mac"])
    }

    /// First non-empty of nickname, hostname and MAC.
    pub fn name(&self) -> Option<&'a str> {
        text_at(self.data, &["nickname"])
            .or_else(|| text_at(self.data, &["hostname"]))
            .or_else(|| text_at(self.data, &["mac"]))
    }

    /// e.g. `"Laptop (Wireless)"`, or `"Laptop (Unknown)"` without a
    /// connection type.
    pub fn name_connection_type(&self) -> String {
        let kind = self
            .connection_type()
            .map_or_else(|| UNKNOWN.to_owned(), title_case);
        format!("{} ({kind})", self.name().unwrap_or(UNKNOWN))
    }

    pub fn name_mac(&self) -> String {
        format!(
            "{} ({})",
            self.name().unwrap_or(UNKNOWN),
            self.mac().unwrap_or_default()
        )
    }

    // ── Attributes ───────────────────────────────────────────────────

    pub fn connected(&self) -> Option<bool> {
        bool_at(self.data, &["connected"])
    }

    pub fn connection_type(&self) -> Option<&'a str> {
        str_at(self.data, &["connection_type"])
    }

    pub fn device_type(&self) -> Option<&'a str> {
        str_at(self.data, &["device_type"])
    }

    pub fn device_category(&self) -> Option<DeviceCategory> {
        self.device_type().and_then(DeviceCategory::from_device_type)
    }

    pub fn ip(&self) -> Option<&'a str> {
        str_at(self.data, &["ip"])
    }

    pub fn is_guest(&self) -> Option<bool> {
        bool_at(self.data, &["is_guest"])
    }

    pub fn is_private(&self) -> Option<bool> {
        bool_at(self.data, &["is_private"])
    }

    pub fn manufacturer(&self) -> Option<&'a str> {
        str_at(self.data, &["manufacturer"])
    }

    pub fn blacklisted(&self) -> Option<bool> {
        bool_at(self.data, &["blacklisted"])
    }

    pub fn paused(&self) -> Option<bool> {
        bool_at(self.data, &["paused"])
    }

    pub fn wireless(&self) -> Option<bool> {
        bool_at(self.data, &["wireless"])
    }

    /// Location of the eero the client is attached to.
    pub fn source_location(&self) -> Option<&'a str> {
        str_at(self.data, &["source", "location"])
    }

    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        let raw = str_at(self.data, &["last_active"])?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    // ── Radio ────────────────────────────────────────────────────────

    pub fn channel(&self) -> Option<u64> {
        u64_at(self.data, &["channel"])
    }

    pub fn channel_width_rx(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "rx_rate_info", "channel_width"])
    }

    pub fn channel_width_tx(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "tx_rate_info", "channel_width"])
    }

    /// `(frequency, unit)` of the radio interface, e.g. `("5", "GHz")`.
    pub fn interface_frequency(&self) -> (Option<String>, Option<&'a str>) {
        let frequency = at(self.data, &["interface", "frequency"]).and_then(|f| match f {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        (frequency, str_at(self.data, &["interface", "frequency_unit"]))
    }

    pub fn score_bars(&self) -> Option<i64> {
        i64_at(self.data, &["connectivity", "score_bars"])
    }

    /// Signal strength split into `(value, unit)`, e.g. `(-52, "dBm")`.
    pub fn signal(&self) -> (Option<i64>, Option<&'a str>) {
        parse_signal(str_at(self.data, &["connectivity", "signal"]))
    }

    /// Current download rate in Mbps.
    pub fn usage_down(&self) -> Option<f64> {
        f64_at(self.data, &["usage", "down_mbps"])
    }

    /// Current upload rate in Mbps.
    pub fn usage_up(&self) -> Option<f64> {
        f64_at(self.data, &["usage", "up_mbps"])
    }

    // ── Activity ─────────────────────────────────────────────────────

    pub fn url_insights(&self) -> String {
        format!(
            "{}/devices/{}",
            self.network.url_insights().unwrap_or_default(),
            self.id()
        )
    }

    pub fn data_usage(&self, activity: Activity) -> DataUsage {
        insights::usage_by_url(self.series(activity), self.url())
    }

    pub fn adblock(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    pub fn blocked(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    pub fn inspected(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    fn insight_sum(&self, activity: Activity) -> Option<u64> {
        insights::sum_where(self.series(activity), "insights_url", &self.url_insights())
    }

    fn series(&self, activity: Activity) -> &'a [Value] {
        insights::entries(insights::series(self.network.data(), "devices", activity))
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn set_paused(&self, value: impl Into<Value>) -> Result<bool, CoreError> {
        let Some(paused) = value.into().as_bool() else {
            return Ok(false);
        };
        issue(
            self.network.session(),
            Method::PUT,
            self.url(),
            Some(json!({ "paused": paused })),
        )
        .await
    }
}

/// Capitalize the first letter of each alphabetic run and lowercase the
/// rest, so `"WIRELESS"` and `"wired_ethernet"` read `"Wireless"` and
/// `"Wired_Ethernet"`.
pub(crate) fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

fn parse_signal(raw: Option<&str>) -> (Option<i64>, Option<&str>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    let mut parts = raw.split_whitespace();
    let value = parts.next().and_then(|v| v.parse().ok());
    (value, parts.next())
}
