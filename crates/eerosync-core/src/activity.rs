// ── Activity catalogue ──
//
// The twelve time-windowed series a network can report, which endpoint
// serves each one, and how requests and stored results are keyed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::window::{ActivityWindow, Period};

/// Endpoint family serving an activity series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEndpoint {
    Insights,
    DataUsage,
}

impl ActivityEndpoint {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::DataUsage => "data_usage",
        }
    }
}

/// `insight_type` sent to the insights endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum InsightType {
    Adblock,
    Blocked,
    Inspected,
}

/// A named activity series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Activity {
    AdblockDay,
    AdblockWeek,
    AdblockMonth,
    BlockedDay,
    BlockedWeek,
    BlockedMonth,
    DataUsageDay,
    DataUsageWeek,
    DataUsageMonth,
    InspectedDay,
    InspectedWeek,
    InspectedMonth,
}

impl Activity {
    pub fn endpoint(self) -> ActivityEndpoint {
        match self.insight_type() {
            Some(_) => ActivityEndpoint::Insights,
            None => ActivityEndpoint::DataUsage,
        }
    }

    /// `None` for data-usage series.
    pub fn insight_type(self) -> Option<InsightType> {
        match self {
            Self::AdblockDay | Self::AdblockWeek | Self::AdblockMonth => Some(InsightType::Adblock),
            Self::BlockedDay | Self::BlockedWeek | Self::BlockedMonth => Some(InsightType::Blocked),
            Self::InspectedDay | Self::InspectedWeek | Self::InspectedMonth => {
                Some(InsightType::Inspected)
            }
            Self::DataUsageDay | Self::DataUsageWeek | Self::DataUsageMonth => None,
        }
    }

    pub fn period(self) -> Period {
        match self {
            Self::AdblockDay | Self::BlockedDay | Self::DataUsageDay | Self::InspectedDay => {
                Period::Day
            }
            Self::AdblockWeek | Self::BlockedWeek | Self::DataUsageWeek | Self::InspectedWeek => {
                Period::Week
            }
            Self::AdblockMonth
            | Self::BlockedMonth
            | Self::DataUsageMonth
            | Self::InspectedMonth => Period::Month,
        }
    }

    /// Key the fetched series is stored under in a network's `activity` map.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// Which resource family an activity series is requested for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityScope {
    Network,
    Eeros,
    Profiles,
    Clients,
}

impl ActivityScope {
    /// Path segment appended after the endpoint; `None` for the network
    /// itself. Clients are served from `devices`.
    pub fn path_segment(self) -> Option<&'static str> {
        match self {
            Self::Network => None,
            Self::Eeros => Some("eeros"),
            Self::Profiles => Some("profiles"),
            Self::Clients => Some("devices"),
        }
    }

    /// Key under the network's `activity` map.
    pub fn data_key(self) -> &'static str {
        self.path_segment().unwrap_or("network")
    }
}

/// Request path for one series, e.g. `<network>/insights/profiles/7`.
pub fn activity_path(
    network_url: &str,
    activity: Activity,
    scope: ActivityScope,
    profile_id: Option<&str>,
) -> String {
    let mut path = format!("{network_url}/{}", activity.endpoint().path_segment());
    if let Some(segment) = scope.path_segment() {
        path.push('/');
        path.push_str(segment);
    }
    if let Some(id) = profile_id {
        path.push('/');
        path.push_str(id);
    }
    path
}

/// JSON body sent with an activity request.
pub fn activity_query(window: &ActivityWindow, timezone: &str, activity: Activity) -> Value {
    let mut body = Map::new();
    body.insert("start".into(), window.start_iso().into());
    body.insert("end".into(), window.end_iso().into());
    body.insert("cadence".into(), window.cadence.to_string().into());
    body.insert("timezone".into(), timezone.into());
    if let Some(kind) = activity.insight_type() {
        body.insert("insight_type".into(), kind.to_string().into());
    }
    Value::Object(body)
}

/// The series inside an activity response: the first present of
/// `insights`, `series`, `values`.
pub fn extract_series(data: &Value) -> Value {
    ["insights", "series", "values"]
        .iter()
        .find_map(|key| data.get(*key))
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    use crate::window::{Cadence, window_at};

    #[test]
    fn catalogue_maps_endpoints_and_periods() {
        assert_eq!(Activity::iter().count(), 12);
        assert_eq!(Activity::AdblockWeek.endpoint(), ActivityEndpoint::Insights);
        assert_eq!(Activity::AdblockWeek.insight_type(), Some(InsightType::Adblock));
        assert_eq!(Activity::DataUsageMonth.endpoint(), ActivityEndpoint::DataUsage);
        assert_eq!(Activity::DataUsageMonth.insight_type(), None);
        assert_eq!(Activity::InspectedDay.period(), Period::Day);
        assert_eq!(Activity::BlockedMonth.key(), "blocked_month");
        assert_eq!("data_usage_week".parse::<Activity>().unwrap(), Activity::DataUsageWeek);
    }

    #[test]
    fn paths_per_scope() {
        let net = "/2.2/networks/1";
        assert_eq!(
            activity_path(net, Activity::AdblockDay, ActivityScope::Network, None),
            "/2.2/networks/1/insights"
        );
        assert_eq!(
            activity_path(net, Activity::DataUsageDay, ActivityScope::Clients, None),
            "/2.2/networks/1/data_usage/devices"
        );
        assert_eq!(
            activity_path(net, Activity::DataUsageWeek, ActivityScope::Eeros, None),
            "/2.2/networks/1/data_usage/eeros"
        );
        assert_eq!(
            activity_path(net, Activity::BlockedMonth, ActivityScope::Profiles, Some("7")),
            "/2.2/networks/1/insights/profiles/7"
        );
        assert_eq!(ActivityScope::Clients.data_key(), "devices");
        assert_eq!(ActivityScope::Network.data_key(), "network");
    }

    #[test]
    fn query_includes_insight_type_only_for_insights() {
        let now = Utc.with_ymd_and_hms(2024, 3, 13, 18, 30, 0).unwrap();
        let window = window_at(Period::Day, chrono_tz::Tz::UTC, now);
        assert_eq!(window.cadence, Cadence::Hourly);

        let q = activity_query(&window, "UTC", Activity::BlockedDay);
        assert_eq!(
            q,
            json!({
                "start": "2024-03-13T00:00:00Z",
                "end": "2024-03-13T23:59:59Z",
                "cadence": "hourly",
                "timezone": "UTC",
                "insight_type": "blocked",
            })
        );

        let q = activity_query(&window, "UTC", Activity::DataUsageDay);
        assert!(q.get("insight_type").is_none());
    }

    #[test]
    fn series_prefers_insights_then_series_then_values() {
        assert_eq!(
            extract_series(&json!({ "values": [3], "series": [2], "insights": [1] })),
            json!([1])
        );
        assert_eq!(extract_series(&json!({ "values": [3], "series": [2] })), json!([2]));
        assert_eq!(extract_series(&json!({ "values": [3] })), json!([3]));
        assert_eq!(extract_series(&json!({ "other": 1 })), Value::Null);
    }
}
