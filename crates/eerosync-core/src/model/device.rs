// ── eero device view ──
//
// One eero unit (gateway, leaf or Beacon). Beacons additionally carry a
// nightlight, exposed through `Device::nightlight`.

use chrono::NaiveTime;
use eerosync_api::Method;
use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::activity::Activity;
use crate::error::CoreError;

use super::firmware::Firmware;
use super::insights::{self, DataUsage};
use super::network::Network;
use super::raw::{bool_at, str_at, u64_at};
use super::resource::ResourceKind;
use super::{issue, require_url};

const EERO_PATH_PREFIX: &str = "/2.2/eeros/";
const BEACON_MODEL: &str = "eero Beacon";
const SCHEDULE_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy)]
pub struct Device<'a> {
    network: Network<'a>,
    data: &'a Value,
}

impl<'a> Device<'a> {
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
        url.strip_prefix(EERO_PATH_PREFIX).unwrap_or(url)
    }

    /// Devices are named after their location.
    pub fn name(&self) -> Option<&'a str> {
        self.location()
    }

    pub fn name_long(&self) -> String {
        format!("{} Eero", self.name().unwrap_or_default())
    }

    pub fn location(&self) -> Option<&'a str> {
        str_at(self.data, &["location"])
    }

    pub fn model(&self) -> Option<&'a str> {
        str_at(self.data, &["model"])
    }

    pub fn model_number(&self) -> Option<&'a str> {
        str_at(self.data, &["model_number"])
    }

    pub fn is_beacon(&self) -> bool {
        self.model() == Some(BEACON_MODEL)
    }

    pub fn mac_address(&self) -> Option<&'a str> {
        str_at(self.data, &["mac_address"])
    }

    pub fn serial(&self) -> Option<&'a str> {
        str_at(self.data, &["serial"])
    }

    pub fn status(&self) -> Option<&'a str> {
        str_at(self.data, &["status"])
    }

    pub fn is_gateway(&self) -> Option<bool> {
        bool_at(self.data, &["gateway"])
    }

    /// Count reported by the device itself.
    pub fn connected_clients_count(&self) -> Option<u64> {
        u64_at(self.data, &["connected_clients_count"])
    }

    /// Names of network clients whose source location is this device.
    pub fn connected_clients_names(&self) -> Vec<String> {
        let Some(name) = self.name() else {
            return Vec::new();
        };
        self.network
            .clients()
            .iter()
            .filter(|c| c.source_location() == Some(name))
            .filter_map(|c| c.name().map(str::to_owned))
            .collect()
    }

    // ── Status light ─────────────────────────────────────────────────

    pub fn status_light_enabled(&self) -> Option<bool> {
        bool_at(self.data, &["led_on"])
    }

    pub fn status_light_brightness(&self) -> Option<u64> {
        u64_at(self.data, &["led_brightness"])
    }

    pub fn url_led(&self) -> Option<&'a str> {
        str_at(self.data, &["resources", "led_action"])
    }

    pub fn url_reboot(&self) -> Option<&'a str> {
        str_at(self.data, &["resources", "reboot"])
    }

    pub async fn set_status_light(&self, value: impl Into<Value>) -> Result<bool, CoreError> {
        let Some(on) = value.into().as_bool() else {
            return Ok(false);
        };
        let url = self.require(self.url_led(), "led_action")?;
        issue(self.network.session(), Method::PUT, url, Some(json!({ "led_on": on }))).await
    }

    /// Set LED brightness in percent; zero turns the light off instead.
    pub async fn set_status_light_brightness(
        &self,
        value: impl Into<Value>,
    ) -> Result<bool, CoreError> {
        let Some(brightness) = value.into().as_u64() else {
            return Ok(false);
        };
        if brightness == 0 {
            return self.set_status_light(false).await;
        }
        let url = self.require(self.url_led(), "led_action")?;
        issue(
            self.network.session(),
            Method::PUT,
            url,
            Some(json!({ "led_brightness": brightness })),
        )
        .await
    }

    pub async fn reboot(&self) -> Result<bool, CoreError> {
        let url = self.require(self.url_reboot(), "reboot")?;
        issue(self.network.session(), Method::POST, url, None).await
    }

    // ── Firmware ─────────────────────────────────────────────────────

    pub fn os_version(&self) -> Option<&'a str> {
        str_at(self.data, &["os_version"])
    }

    pub fn update_available(&self) -> Option<bool> {
        bool_at(self.data, &["update_available"])
    }

    pub fn support_expired(&self) -> Option<bool> {
        bool_at(self.data, &["update_status", "support_expired"])
    }

    pub fn support_expiration_string(&self) -> Option<&'a str> {
        str_at(self.data, &["update_status", "support_expiration_string"])
    }

    /// Release-notes entry matching the running OS version, build suffix
    /// stripped.
    pub fn current_firmware(&self) -> Firmware<'a> {
        let Some(version) = self.os_version().and_then(|v| v.split('-').next()) else {
            return Firmware::default();
        };
        self.network
            .firmware_history()
            .into_iter()
            .find(|f| f.os_version() == Some(version))
            .unwrap_or_default()
    }

    /// Devices past end of support stay on their current firmware.
    pub fn target_firmware(&self) -> Firmware<'a> {
        if self.support_expired() == Some(true) {
            self.current_firmware()
        } else {
            self.network.target_firmware()
        }
    }

    // ── Activity ─────────────────────────────────────────────────────

    pub fn data_usage(&self, activity: Activity) -> DataUsage {
        let series = insights::series(self.network.data(), "eeros", activity);
        insights::usage_by_url(insights::entries(series), self.url())
    }

    // ── Nightlight ───────────────────────────────────────────────────

    /// Nightlight controls; `None` unless this is a Beacon.
    pub fn nightlight(&self) -> Option<Nightlight<'a>> {
        self.is_beacon().then_some(Nightlight { device: *self })
    }

    fn require(&self, url: Option<&'a str>, resource: &str) -> Result<&'a str, CoreError> {
        require_url(url, ResourceKind::Device, self.id(), resource)
    }
}

/// How a Beacon's nightlight decides when to glow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NightlightMode {
    Disabled,
    Ambient,
    #[strum(to_string = "scheduled", serialize = "schedule")]
    #[serde(rename = "scheduled")]
    Scheduled,
}

/// Nightlight of an eero Beacon.
#[derive(Debug, Clone, Copy)]
pub struct Nightlight<'a> {
    device: Device<'a>,
}

impl<'a> Nightlight<'a> {
    pub fn device(&self) -> Device<'a> {
        self.device
    }

    pub fn enabled(&self) -> Option<bool> {
        bool_at(self.device.data, &["nightlight", "enabled"])
    }

    pub fn brightness_percentage(&self) -> Option<u64> {
        u64_at(self.device.data, &["nightlight", "brightness_percentage"])
    }

    pub fn schedule_enabled(&self) -> Option<bool> {
        bool_at(self.device.data, &["nightlight", "schedule", "enabled"])
    }

    /// Raw `(on, off)` schedule times, `"HH:MM"`.
    pub fn schedule(&self) -> (Option<&'a str>, Option<&'a str>) {
        let data = self.device.data;
        (
            str_at(data, &["nightlight", "schedule", "on"]),
            str_at(data, &["nightlight", "schedule", "off"]),
        )
    }

    pub fn schedule_on(&self) -> Option<NaiveTime> {
        parse_schedule_time(self.schedule().0)
    }

    pub fn schedule_off(&self) -> Option<NaiveTime> {
        parse_schedule_time(self.schedule().1)
    }

    pub fn mode(&self) -> NightlightMode {
        if self.enabled() != Some(true) {
            NightlightMode::Disabled
        } else if self.schedule_enabled() != Some(true) {
            NightlightMode::Ambient
        } else {
            NightlightMode::Scheduled
        }
    }

    pub async fn set_mode(&self, mode: NightlightMode) -> Result<bool, CoreError> {
        match mode {
            NightlightMode::Disabled => self.set_disabled().await,
            NightlightMode::Ambient => self.set_ambient().await,
            NightlightMode::Scheduled => {
                let (on, off) = self.schedule();
                self.set_schedule(on, off).await
            }
        }
    }

    pub async fn set_ambient(&self) -> Result<bool, CoreError> {
        self.put(json!({ "enabled": true, "schedule": { "enabled": false } }))
            .await
    }

    pub async fn set_disabled(&self) -> Result<bool, CoreError> {
        self.put(json!({ "enabled": false })).await
    }

    /// Enable the schedule with `"HH:MM"` on/off times. Non-string values
    /// are ignored.
    pub async fn set_schedule(
        &self,
        on: impl Into<Value>,
        off: impl Into<Value>,
    ) -> Result<bool, CoreError> {
        let (on, off) = (on.into(), off.into());
        let (Some(on), Some(off)) = (on.as_str(), off.as_str()) else {
            debug!("ignoring non-string nightlight schedule");
            return Ok(false);
        };
        self.put(json!({
            "enabled": true,
            "schedule": { "enabled": true, "on": on, "off": off },
        }))
        .await
    }

    /// Move the switch-on time, keeping the switch-off time.
    pub async fn set_schedule_on(&self, on: NaiveTime) -> Result<bool, CoreError> {
        let on = on.format(SCHEDULE_TIME_FORMAT).to_string();
        self.set_schedule(on, self.schedule().1).await
    }

    /// Move the switch-off time, keeping the switch-on time.
    pub async fn set_schedule_off(&self, off: NaiveTime) -> Result<bool, CoreError> {
        let off = off.format(SCHEDULE_TIME_FORMAT).to_string();
        self.set_schedule(self.schedule().0, off).await
    }

    pub async fn set_brightness(&self, value: impl Into<Value>) -> Result<bool, CoreError> {
        let Some(percentage) = value.into().as_u64() else {
            return Ok(false);
        };
        let (on, off) = self.schedule();
        self.put(json!({
            "enabled": true,
            "brightness_percentage": percentage,
            "schedule": { "enabled": true, "on": on, "off": off },
        }))
        .await
    }

    async fn put(&self, body: Value) -> Result<bool, CoreError> {
        let path = format!("{EERO_PATH_PREFIX}{}/nightlight/settings", self.device.id());
        issue(self.device.network.session(), Method::PUT, &path, Some(body)).await
    }
}

fn parse_schedule_time(value: Option<&str>) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value?, SCHEDULE_TIME_FORMAT).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_parses_both_spellings() {
        assert_eq!(
            "schedule".parse::<NightlightMode>().unwrap(),
            NightlightMode::Scheduled
        );
        assert_eq!(
            "scheduled".parse::<NightlightMode>().unwrap(),
            NightlightMode::Scheduled
        );
        assert_eq!(NightlightMode::Scheduled.to_string(), "scheduled");
        assert_eq!(NightlightMode::Ambient.to_string(), "ambient");
    }

    #[test]
    fn schedule_times_parse_hours_and_minutes() {
        assert_eq!(
            parse_schedule_time(Some("07:05")),
            NaiveTime::from_hms_opt(7, 5, 0)
        );
        assert_eq!(parse_schedule_time(Some("7 pm")), None);
        assert_eq!(parse_schedule_time(None), None);
    }
}
