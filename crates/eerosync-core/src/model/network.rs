// ── Network view ──
//
// Read accessors over one network's assembled payload plus the setting
// mutations the service exposes for it. Sub-resources borrow the same
// account snapshot and point back here by index.

use eerosync_api::{Method, Session};
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::activity::Activity;
use crate::error::CoreError;

use super::account::Account;
use super::backup::BackupNetwork;
use super::category::DeviceCategory;
use super::client::Client;
use super::device::Device;
use super::firmware::Firmware;
use super::insights::{self, BlockedCounts, DataUsage};
use super::profile::Profile;
use super::raw::{NULL, at, bool_at, list_at, str_at, text_at, u64_at};
use super::resource::{Resource, ResourceKind};
use super::{issue, require_url, wifi_uri};

const NETWORK_PATH_PREFIX: &str = "/2.2/networks/";

/// `(label, hour)` pairs accepted by the preferred-update-hour setting.
pub const PREFERRED_UPDATE_HOURS: [(&str, u64); 24] = [
    ("12am_1am", 0),
    ("1am_2am", 1),
    ("2am_3am", 2),
    ("3am_4am", 3),
    ("4am_5am", 4),
    ("5am_6am", 5),
    ("6am_7am", 6),
    ("7am_8am", 7),
    ("8am_9am", 8),
    ("9am_10am", 9),
    ("10am_11am", 10),
    ("11am_12pm", 11),
    ("12pm_1pm", 12),
    ("1pm_2pm", 13),
    ("2pm_3pm", 14),
    ("3pm_4pm", 15),
    ("4pm_5pm", 16),
    ("5pm_6pm", 17),
    ("6pm_7pm", 18),
    ("7pm_8pm", 19),
    ("8pm_9pm", 20),
    ("9pm_10pm", 21),
    ("10pm_11pm", 22),
    ("11pm_12am", 23),
];

/// Premium subscription states that unlock premium features.
const PREMIUM_ACTIVE: [&str; 2] = ["active", "trialing"];

/// Where network-wide ad blocking currently applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AdBlockStatus {
    Network,
    Profile,
    Disabled,
}

/// Boolean network settings that can be toggled remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum NetworkSetting {
    AdBlock,
    BackupInternet,
    BandSteering,
    BlockMalware,
    Ddns,
    DnsCaching,
    GuestNetwork,
    Ipv6Upstream,
    Sqm,
    Thread,
    Upnp,
    Wpa3,
}

/// One network in an account snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Network<'a> {
    account: &'a Account,
    index: usize,
}

impl<'a> Network<'a> {
    pub(crate) fn new(account: &'a Account, index: usize) -> Self {
        Self { account, index }
    }

    pub fn account(&self) -> &'a Account {
        self.account
    }

    pub(crate) fn session(&self) -> &'a Session {
        self.account.session()
    }

    /// Raw assembled payload.
    pub fn data(&self) -> &'a Value {
        self.account
            .network_data()
            .get(self.index)
            .unwrap_or(&NULL)
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn url(&self) -> &'a str {
        str_at(self.data(), &["url"]).unwrap_or_default()
    }

    pub fn id(&self) -> &'a str {
        let url = self.url();
        url.strip_prefix(NETWORK_PATH_PREFIX).unwrap_or(url)
    }

    pub fn name(&self) -> Option<&'a str> {
        str_at(self.data(), &["name"])
    }

    pub fn nickname(&self) -> Option<&'a str> {
        text_at(self.data(), &["nickname_label"])
    }

    /// Name qualified with nickname and location, to tell networks apart.
    pub fn name_unique(&self) -> String {
        let name = self.name().unwrap_or_default();
        let city = self.city().unwrap_or_default();
        let region = self.region_name().unwrap_or_default();
        match self.nickname() {
            Some(nick) => format!("{name} \"{nick}\" ({city}, {region})"),
            None => format!("{name} ({city}, {region})"),
        }
    }

    /// The main SSID is the network name.
    pub fn ssid(&self) -> Option<&'a str> {
        self.name()
    }

    pub fn password(&self) -> Option<&'a str> {
        str_at(self.data(), &["password"])
    }

    /// `WIFI:` URI for joining the main network.
    pub fn wifi_uri(&self) -> Option<String> {
        wifi_uri(self.ssid()?, self.password())
    }

    pub fn status(&self) -> Option<&'a str> {
        str_at(self.data(), &["status"])
    }

    /// IANA timezone the service reports for the network.
    pub fn timezone(&self) -> Option<&'a str> {
        str_at(self.data(), &["timezone", "value"])
    }

    // ── Location & health ────────────────────────────────────────────

    pub fn city(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "city"])
    }

    pub fn country_code(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "countryCode"])
    }

    pub fn country_name(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "countryName"])
    }

    pub fn isp(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "isp"])
    }

    pub fn postal_code(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "postalCode"])
    }

    pub fn region(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "region"])
    }

    pub fn region_name(&self) -> Option<&'a str> {
        str_at(self.data(), &["geo_ip", "regionName"])
    }

    pub fn public_ip(&self) -> Option<&'a str> {
        str_at(self.data(), &["ip_settings", "public_ip"])
    }

    pub fn health_eero_network_status(&self) -> Option<&'a str> {
        str_at(self.data(), &["health", "eero_network", "status"])
    }

    pub fn health_internet_isp_up(&self) -> Option<bool> {
        bool_at(self.data(), &["health", "internet", "isp_up"])
    }

    pub fn health_internet_status(&self) -> Option<&'a str> {
        str_at(self.data(), &["health", "internet", "status"])
    }

    /// When the last speed test ran.
    pub fn speed_date(&self) -> Option<&'a str> {
        str_at(self.data(), &["speed", "date"])
    }

    /// `(value, units)` of the last download speed test.
    pub fn speed_down(&self) -> (Option<f64>, Option<&'a str>) {
        self.speed("down")
    }

    /// `(value, units)` of the last upload speed test.
    pub fn speed_up(&self) -> (Option<f64>, Option<&'a str>) {
        self.speed("up")
    }

    fn speed(&self, direction: &str) -> (Option<f64>, Option<&'a str>) {
        let data = self.data();
        (
            at(data, &["speed", direction, "value"]).and_then(Value::as_f64),
            str_at(data, &["speed", direction, "units"]),
        )
    }

    // ── Premium ──────────────────────────────────────────────────────

    pub fn premium_capable(&self) -> Option<bool> {
        bool_at(self.data(), &["capabilities", "premium", "capable"])
    }

    pub fn premium_status(&self) -> Option<&'a str> {
        str_at(self.data(), &["premium_status"])
    }

    /// Premium-capable and subscribed (active or trialing).
    pub fn premium_enabled(&self) -> bool {
        premium_ok(self.data())
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn ad_block_enabled(&self) -> Option<bool> {
        bool_at(self.data(), &["premium_dns", "ad_block_settings", "enabled"])
    }

    /// Profile URLs ad blocking is restricted to.
    pub fn ad_block_profiles(&self) -> Vec<&'a str> {
        list_at(self.data(), &["premium_dns", "ad_block_settings", "profiles"])
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    /// Ad blocking applies network-wide: enabled and not restricted to
    /// any profile.
    pub fn ad_block(&self) -> bool {
        self.ad_block_enabled() == Some(true) && self.ad_block_profiles().is_empty()
    }

    pub fn ad_block_status(&self) -> AdBlockStatus {
        if self.ad_block() {
            AdBlockStatus::Network
        } else if !self.ad_block_profiles().is_empty() {
            AdBlockStatus::Profile
        } else {
            AdBlockStatus::Disabled
        }
    }

    pub fn backup_internet_enabled(&self) -> Option<bool> {
        bool_at(self.data(), &["backup_internet_enabled"])
    }

    pub fn band_steering(&self) -> Option<bool> {
        bool_at(self.data(), &["band_steering"])
    }

    pub fn block_malware(&self) -> Option<bool> {
        bool_at(self.data(), &["premium_dns", "dns_policies", "block_malware"])
    }

    pub fn ddns_enabled(&self) -> Option<bool> {
        bool_at(self.data(), &["ddns", "enabled"])
    }

    pub fn ddns_subdomain(&self) -> Option<&'a str> {
        str_at(self.data(), &["ddns", "subdomain"])
    }

    pub fn dns_caching(&self) -> Option<bool> {
        bool_at(self.data(), &["dns", "caching"])
    }

    pub fn guest_network_enabled(&self) -> Option<bool> {
        bool_at(self.data(), &["guest_network", "enabled"])
    }

    pub fn guest_network_name(&self) -> Option<&'a str> {
        str_at(self.data(), &["guest_network", "name"])
    }

    pub fn guest_network_password(&self) -> Option<&'a str> {
        str_at(self.data(), &["guest_network", "password"])
    }

    /// `WIFI:` URI for joining the guest network.
    pub fn guest_network_wifi_uri(&self) -> Option<String> {
        wifi_uri(self.guest_network_name()?, self.guest_network_password())
    }

    pub fn ipv6_upstream(&self) -> Option<bool> {
        bool_at(self.data(), &["ipv6_upstream"])
    }

    pub fn sqm(&self) -> Option<bool> {
        bool_at(self.data(), &["sqm"])
    }

    pub fn upnp(&self) -> Option<bool> {
        bool_at(self.data(), &["upnp"])
    }

    pub fn wpa3(&self) -> Option<bool> {
        bool_at(self.data(), &["wpa3"])
    }

    /// Current value of a toggleable setting.
    pub fn setting(&self, setting: NetworkSetting) -> Option<bool> {
        match setting {
            NetworkSetting::AdBlock => Some(self.ad_block()),
            NetworkSetting::BackupInternet => self.backup_internet_enabled(),
            NetworkSetting::BandSteering => self.band_steering(),
            NetworkSetting::BlockMalware => self.block_malware(),
            NetworkSetting::Ddns => self.ddns_enabled(),
            NetworkSetting::DnsCaching => self.dns_caching(),
            NetworkSetting::GuestNetwork => self.guest_network_enabled(),
            NetworkSetting::Ipv6Upstream => self.ipv6_upstream(),
            NetworkSetting::Sqm => self.sqm(),
            NetworkSetting::Thread => self.thread_enabled(),
            NetworkSetting::Upnp => self.upnp(),
            NetworkSetting::Wpa3 => self.wpa3(),
        }
    }

    /// Label of the preferred update hour, e.g. `"3am_4am"`.
    pub fn preferred_update_hour(&self) -> Option<&'static str> {
        let hour = u64_at(self.data(), &["updates", "preferred_update_hour"])?;
        PREFERRED_UPDATE_HOURS
            .iter()
            .find(|(_, h)| *h == hour)
            .map(|(label, _)| *label)
    }

    pub fn preferred_update_hour_options(&self) -> impl Iterator<Item = &'static str> {
        PREFERRED_UPDATE_HOURS.iter().map(|(label, _)| *label)
    }

    // ── Thread ───────────────────────────────────────────────────────

    pub fn thread_enabled(&self) -> Option<bool> {
        bool_at(self.data(), &["thread", "enabled"])
    }

    pub fn thread_name(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "name"])
    }

    pub fn thread_channel(&self) -> Option<u64> {
        u64_at(self.data(), &["thread", "channel"])
    }

    pub fn thread_pan_id(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "pan_id"])
    }

    pub fn thread_xpan_id(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "xpan_id"])
    }

    pub fn thread_master_key(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "master_key"])
    }

    pub fn thread_commissioning_credential(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "commissioning_credential"])
    }

    pub fn thread_active_operational_dataset(&self) -> Option<&'a str> {
        str_at(self.data(), &["thread", "active_operational_dataset"])
    }

    // ── Firmware ─────────────────────────────────────────────────────

    pub fn manifest_resource(&self) -> Option<&'a str> {
        str_at(self.data(), &["updates", "manifest_resource"])
    }

    pub fn target_firmware(&self) -> Firmware<'a> {
        Firmware::new(at(self.data(), &["updates", "release_notes", "target"]))
    }

    pub fn firmware_history(&self) -> Vec<Firmware<'a>> {
        list_at(self.data(), &["updates", "release_notes", "history"])
            .iter()
            .map(|entry| Firmware::new(Some(entry)))
            .collect()
    }

    // ── Resource URLs ────────────────────────────────────────────────

    pub fn url_dns_policies(&self) -> String {
        format!("{}/dns_policies", self.url())
    }

    pub fn url_insights(&self) -> Option<&'a str> {
        str_at(self.data(), &["resources", "insights"])
    }

    pub fn url_reboot(&self) -> Option<&'a str> {
        str_at(self.data(), &["resources", "reboot"])
    }

    pub fn url_settings(&self) -> Option<&'a str> {
        str_at(self.data(), &["resources", "settings"])
    }

    pub fn url_thread(&self) -> Option<&'a str> {
        str_at(self.data(), &["resources", "thread"])
    }

    pub fn url_updates(&self) -> Option<&'a str> {
        str_at(self.data(), &["resources", "updates"])
    }

    // ── Sub-resources ────────────────────────────────────────────────

    pub fn backup_networks(&self) -> Vec<BackupNetwork<'a>> {
        list_at(self.data(), &["backup_access_points", "data"])
            .iter()
            .map(|data| BackupNetwork::new(*self, data))
            .collect()
    }

    /// eero units of the network.
    pub fn devices(&self) -> Vec<Device<'a>> {
        list_at(self.data(), &["eeros", "data"])
            .iter()
            .map(|data| Device::new(*self, data))
            .collect()
    }

    pub fn profiles(&self) -> Vec<Profile<'a>> {
        list_at(self.data(), &["profiles", "data"])
            .iter()
            .map(|data| Profile::new(*self, data))
            .collect()
    }

    pub fn clients(&self) -> Vec<Client<'a>> {
        list_at(self.data(), &["devices", "data"])
            .iter()
            .map(|data| Client::new(*self, data))
            .collect()
    }

    /// Backup networks, devices, profiles, then clients.
    pub fn resources(&self) -> Vec<Resource<'a>> {
        let backups = self.backup_networks().into_iter().map(Resource::BackupNetwork);
        let devices = self.devices().into_iter().map(Resource::Device);
        let profiles = self.profiles().into_iter().map(Resource::Profile);
        let clients = self.clients().into_iter().map(Resource::Client);
        backups.chain(devices).chain(profiles).chain(clients).collect()
    }

    /// Client count as reported by the service.
    pub fn clients_count(&self) -> Option<u64> {
        u64_at(self.data(), &["clients", "count"])
    }

    pub fn connected_clients_count(&self) -> usize {
        self.count_connected(|_| true)
    }

    pub fn connected_clients_count_in(&self, category: DeviceCategory) -> usize {
        self.count_connected(|c| c.device_category() == Some(category))
    }

    pub fn connected_guest_clients_count(&self) -> usize {
        self.count_connected(|c| c.is_guest() == Some(true))
    }

    pub fn connected_guest_clients_count_in(&self, category: DeviceCategory) -> usize {
        self.count_connected(|c| {
            c.is_guest() == Some(true) && c.device_category() == Some(category)
        })
    }

    fn count_connected(&self, filter: impl Fn(&Client<'a>) -> bool) -> usize {
        self.clients()
            .iter()
            .filter(|c| c.connected() == Some(true) && filter(c))
            .count()
    }

    pub fn gateway(&self) -> Option<Device<'a>> {
        self.devices().into_iter().find(|d| d.is_gateway() == Some(true))
    }

    pub fn gateway_name(&self) -> Option<&'a str> {
        self.gateway().and_then(|d| d.name())
    }

    pub fn gateway_mac_address(&self) -> Option<&'a str> {
        self.gateway().and_then(|d| d.mac_address())
    }

    // ── Activity ─────────────────────────────────────────────────────

    /// Ad-block hits for `activity` (one of the `adblock_*` series).
    pub fn adblock(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity, "adblock")
    }

    /// Inspected-request count for `activity` (one of the `inspected_*` series).
    pub fn inspected(&self, activity: Activity) -> Option<u64> {
        self.insight_sum(activity, "inspected")
    }

    /// Blocked threats by category for `activity` (one of the `blocked_*` series).
    pub fn blocked(&self, activity: Activity) -> BlockedCounts {
        insights::blocked_counts(self.network_series(activity))
    }

    /// Download/upload for `activity` (one of the `data_usage_*` series).
    pub fn data_usage(&self, activity: Activity) -> DataUsage {
        insights::usage_by_type(self.network_series(activity))
    }

    fn insight_sum(&self, activity: Activity, insight_type: &str) -> Option<u64> {
        insights::sum_where(self.network_series(activity), "insight_type", insight_type)
    }

    fn network_series(&self, activity: Activity) -> &'a [Value] {
        insights::entries(insights::series(self.data(), "network", activity))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Toggle a boolean setting. A non-boolean `value` is ignored and
    /// returns `Ok(false)`; otherwise exactly one call is made.
    pub async fn set(
        &self,
        setting: NetworkSetting,
        value: impl Into<Value>,
    ) -> Result<bool, CoreError> {
        let Some(enabled) = value.into().as_bool() else {
            debug!(%setting, "ignoring non-boolean value");
            return Ok(false);
        };

        let id = self.id();
        let (method, path, body) = match setting {
            NetworkSetting::AdBlock => (
                Method::POST,
                format!("{}/adblock", self.url_dns_policies()),
                Some(json!({ "enable": enabled })),
            ),
            NetworkSetting::BackupInternet => (
                Method::PUT,
                format!("{}/backupinternet", self.url()),
                Some(json!({ "backup_internet_enabled": enabled })),
            ),
            NetworkSetting::BlockMalware => (
                Method::POST,
                format!("{}/network", self.url_dns_policies()),
                Some(json!({ "block_malware": enabled })),
            ),
            NetworkSetting::Ddns => {
                let target = if enabled { "enable" } else { "disable" };
                (Method::PUT, format!("{NETWORK_PATH_PREFIX}{id}/ddns/{target}"), None)
            }
            NetworkSetting::DnsCaching => (
                Method::PUT,
                format!("{NETWORK_PATH_PREFIX}{id}/dns"),
                Some(json!({ "caching": enabled })),
            ),
            NetworkSetting::GuestNetwork => (
                Method::PUT,
                format!("{NETWORK_PATH_PREFIX}{id}/guestnetwork"),
                Some(json!({ "enabled": enabled })),
            ),
            NetworkSetting::Thread => {
                let thread = self.require(self.url_thread(), "thread")?;
                (
                    Method::PUT,
                    format!("{thread}/enable"),
                    Some(json!({ "enabled": enabled })),
                )
            }
            NetworkSetting::BandSteering
            | NetworkSetting::Ipv6Upstream
            | NetworkSetting::Sqm
            | NetworkSetting::Upnp
            | NetworkSetting::Wpa3 => {
                let field = match setting {
                    NetworkSetting::BandSteering => "band_steering",
                    NetworkSetting::Ipv6Upstream => "ipv6_upstream",
                    NetworkSetting::Sqm => "sqm",
                    NetworkSetting::Upnp => "upnp",
                    _ => "wpa3",
                };
                let settings = self.require(self.url_settings(), "settings")?;
                let mut body = serde_json::Map::new();
                body.insert(field.into(), enabled.into());
                (Method::PUT, settings.to_owned(), Some(Value::Object(body)))
            }
        };

        issue(self.session(), method, &path, body).await
    }

    /// Set the preferred update hour by label (see
    /// [`PREFERRED_UPDATE_HOURS`]). Unknown labels are ignored.
    pub async fn set_preferred_update_hour(&self, label: &str) -> Result<bool, CoreError> {
        let Some((_, hour)) = PREFERRED_UPDATE_HOURS.iter().find(|(l, _)| *l == label) else {
            debug!(label, "ignoring unknown preferred update hour");
            return Ok(false);
        };
        issue(
            self.session(),
            Method::POST,
            &format!("{NETWORK_PATH_PREFIX}{}/updates/preferred_update_hour", self.id()),
            Some(json!({ "preferred_update_hour": hour })),
        )
        .await
    }

    /// Reboot every eero on the network.
    pub async fn reboot(&self) -> Result<bool, CoreError> {
        let url = self.require(self.url_reboot(), "reboot")?;
        issue(self.session(), Method::POST, url, None).await
    }

    /// Install pending firmware updates.
    pub async fn run_update(&self) -> Result<bool, CoreError> {
        let url = self.require(self.url_updates(), "updates")?;
        issue(self.session(), Method::POST, url, None).await
    }

    fn require(&self, url: Option<&'a str>, resource: &str) -> Result<&'a str, CoreError> {
        require_url(url, ResourceKind::Network, self.id(), resource)
    }
}

/// `capabilities.premium.capable` and an active or trialing subscription.
pub(crate) fn premium_ok(data: &Value) -> bool {
    bool_at(data, &["capabilities", "premium", "capable"]) == Some(true)
        && str_at(data, &["premium_status"]).is_some_and(|s| PREMIUM_ACTIVE.contains(&s))
}

/// Backup access points are offered when capable and every listed
/// requirement is met.
pub(crate) fn backup_access_point_ok(data: &Value) -> bool {
    let capable = bool_at(data, &["capabilities", "backup_access_point", "capable"]) == Some(true);
    let requirements_met =
        match at(data, &["capabilities", "backup_access_point", "requirements"]) {
            Some(Value::Object(map)) => map.values().all(|met| met.as_bool() == Some(true)),
            _ => true,
        };
    capable && requirements_met
}
