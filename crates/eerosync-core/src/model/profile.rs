// ── Profile view ──
//
// A named group of clients with its own content filters. Member clients
// are embedded in the profile payload rather than owned by it.

use chrono::{DateTime, Utc};
use eerosync_api::Method;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::activity::Activity;
use crate::error::CoreError;

use super::client::Client;
use super::insights::{self, DataUsage};
use super::issue;
use super::network::Network;
use super::raw::{at, bool_at, list_at, str_at};

/// Boolean profile settings that can be toggled remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ProfileSetting {
    AdBlock,
    Paused,
    BlockGamingContent,
    BlockIllegalContent,
    BlockMessagingContent,
    BlockPornographicContent,
    BlockShoppingContent,
    BlockSocialContent,
    BlockStreamingContent,
    BlockViolentContent,
    SafeSearchEnabled,
    YoutubeRestricted,
}

impl ProfileSetting {
    /// Field under `unified_content_filters.dns_policies`, for the content
    /// filter settings.
    pub fn dns_policy_field(self) -> Option<&'static str> {
        let field = match self {
            Self::AdBlock | Self::Paused => return None,
            Self::BlockGamingContent => "block_gaming_content",
            Self::BlockIllegalContent => "block_illegal_content",
            Self::BlockMessagingContent => "block_messaging_content",
            Self::BlockPornographicContent => "block_pornographic_content",
            Self::BlockShoppingContent => "block_shopping_content",
            Self::BlockSocialContent => "block_social_content",
            Self::BlockStreamingContent => "block_streaming_content",
            Self::BlockViolentContent => "block_violent_content",
            Self::SafeSearchEnabled => "safe_search_enabled",
            Self::YoutubeRestricted => "youtube_restricted",
        };
        Some(field)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Profile<'a> {
    network: Network<'a>,
    data: &'a Value,
}

impl<'a> Profile<'a> {
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
            .and_then(|rest| rest.strip_prefix("/profiles/"))
            .unwrap_or(url)
    }

    pub fn name(&self) -> Option<&'a str> {
        str_at(self.data, &["name"])
    }

    pub fn name_long(&self) -> String {
        format!("{} Profile", self.name().unwrap_or_default())
    }

    pub fn paused(&self) -> Option<bool> {
        bool_at(self.data, &["paused"])
    }

    pub fn url_dns_policies(&self) -> String {
        format!("{}/dns_policies/profiles/{}", self.network.url(), self.id())
    }

    pub fn url_insights(&self) -> String {
        format!(
            "{}/profiles/{}",
            self.network.url_insights().unwrap_or_default(),
            self.id()
        )
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Ad blocking is on network-wide and restricted to this profile.
    pub fn ad_block(&self) -> bool {
        self.network.ad_block_enabled() == Some(true)
            && self.network.ad_block_profiles().contains(&self.url())
    }

    pub fn blocked_applications(&self) -> Vec<&'a str> {
        list_at(self.data, &["premium_dns", "blocked_applications"])
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    pub fn block_apps_enabled(&self) -> bool {
        !self.blocked_applications().is_empty()
    }

    /// Current value of a toggleable setting.
    pub fn setting(&self, setting: ProfileSetting) -> Option<bool> {
        match setting {
            ProfileSetting::AdBlock => Some(self.ad_block()),
            ProfileSetting::Paused => self.paused(),
            other => other.dns_policy_field().and_then(|field| {
                bool_at(self.data, &["unified_content_filters", "dns_policies", field])
            }),
        }
    }

    // ── Members ──────────────────────────────────────────────────────

    pub fn clients(&self) -> Vec<Client<'a>> {
        list_at(self.data, &["devices"])
            .iter()
            .map(|data| Client::new(self.network, data))
            .collect()
    }

    pub fn connected_clients_names(&self) -> Vec<&'a str> {
        self.clients()
            .iter()
            .filter(|c| c.connected() == Some(true))
            .filter_map(Client::name)
            .collect()
    }

    pub fn connected_clients_count(&self) -> usize {
        self.clients()
            .iter()
            .filter(|c| c.connected() == Some(true))
            .count()
    }

    pub fn connected(&self) -> bool {
        self.connected_clients_count() != 0
    }

    /// Most recent activity among member clients.
    pub fn last_active(&self) -> Option<DateTime<Utc>> {
        self.clients().iter().filter_map(Client::last_active).max()
    }

    // ── Activity ─────────────────────────────────────────────────────

    pub fn adblock(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    pub fn blocked(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    pub fn inspected(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity)
    }

    pub fn data_usage(&self, activity: Activity) -> DataUsage {
        insights::usage_by_type(self.own_series(activity))
    }

    /// Fetched per profile, series are stored keyed by profile id; a flat
    /// list is matched by `insights_url`.
    fn insight_sum(&self, activity: Activity) -> Option<u64> {
        match insights::series(self.network.data(), "profiles", activity) {
            Some(Value::Array(entries)) => {
                insights::sum_where(entries, "insights_url", &self.url_insights())
            }
            Some(Value::Object(_)) => self
                .own_series(activity)
                .iter()
                .find_map(|entry| entry.get("sum").and_then(Value::as_u64)),
            _ => None,
        }
    }

    fn own_series(&self, activity: Activity) -> &'a [Value] {
        let stored = insights::series(self.network.data(), "profiles", activity);
        insights::entries(stored.and_then(|by_id| at(by_id, &[self.id()])))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Toggle a boolean setting. A non-boolean `value` is ignored and
    /// returns `Ok(false)`; otherwise exactly one call is made.
    pub async fn set(
        &self,
        setting: ProfileSetting,
        value: impl Into<Value>,
    ) -> Result<bool, CoreError> {
        let Some(enabled) = value.into().as_bool() else {
            debug!(%setting, "ignoring non-boolean value");
            return Ok(false);
        };
        let session = self.network.session();

        match setting {
            ProfileSetting::AdBlock => {
                let mut profiles = self.network.ad_block_profiles();
                profiles.retain(|url| *url != self.url());
                if enabled {
                    profiles.push(self.url());
                }
                // Removing one profile keeps ad blocking on for the rest.
                let enable = enabled || !profiles.is_empty();
                issue(
                    session,
                    Method::POST,
                    &format!("{}/adblock", self.network.url_dns_policies()),
                    Some(json!({ "enable": enable, "profiles": profiles })),
                )
                .await
            }
            ProfileSetting::Paused => {
                issue(
                    session,
                    Method::PUT,
                    self.url(),
                    Some(json!({ "paused": enabled })),
                )
                .await
            }
            filter => {
                let Some(field) = filter.dns_policy_field() else {
                    return Ok(false);
                };
                let mut body = serde_json::Map::new();
                body.insert(field.into(), enabled.into());
                issue(
                    session,
                    Method::POST,
                    &self.url_dns_policies(),
                    Some(Value::Object(body)),
                )
                .await
            }
        }
    }

    /// Replace the blocked-application list. Anything but an array of
    /// strings is ignored.
    pub async fn set_blocked_applications(
        &self,
        value: impl Into<Value>,
    ) -> Result<bool, CoreError> {
        let value = value.into();
        let Some(apps) = value.as_array().filter(|a| a.iter().all(Value::is_string)) else {
            debug!("ignoring non-list blocked applications");
            return Ok(false);
        };
        issue(
            self.network.session(),
            Method::PUT,
            &format!("{}/applications/blocked", self.url_dns_policies()),
            Some(json!({ "applications": apps })),
        )
        .await
    }
}
