// ── Resource model ──
//
// Borrowed views over an `Account` snapshot. Reads never touch the
// network; mutations issue exactly one remote call and leave the
// snapshot as it is until the next sync cycle.

pub mod account;
pub mod backup;
pub mod category;
pub mod client;
pub mod device;
pub mod firmware;
pub mod insights;
pub mod network;
pub mod profile;
mod raw;
pub mod resource;

pub use account::Account;
pub use backup::BackupNetwork;
pub use category::DeviceCategory;
pub use client::Client;
pub use device::{Device, Nightlight, NightlightMode};
pub use firmware::Firmware;
pub use insights::{BlockedCounts, DataUsage};
pub use network::{AdBlockStatus, Network, NetworkSetting, PREFERRED_UPDATE_HOURS};
pub use profile::{Profile, ProfileSetting};
pub use resource::{DerivedAttribute, Resource, ResourceKind};

use eerosync_api::{Method, Session};
use serde_json::Value;
use tracing::debug;

use crate::error::CoreError;

/// Issue a single mutation call. Returns `Ok(true)` once the call succeeds.
pub(crate) async fn issue(
    session: &Session,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> Result<bool, CoreError> {
    debug!(%method, path, "mutation");
    session.call(method, path, body.as_ref()).await?;
    Ok(true)
}

/// Unwrap a resource URL or report which one is missing.
pub(crate) fn require_url<'a>(
    url: Option<&'a str>,
    kind: ResourceKind,
    identifier: &str,
    resource: &str,
) -> Result<&'a str, CoreError> {
    url.ok_or_else(|| CoreError::MissingUrl {
        kind: kind.to_string(),
        identifier: identifier.to_owned(),
        resource: resource.to_owned(),
    })
}

/// `WIFI:` join URI as rendered into QR codes.
pub(crate) fn wifi_uri(ssid: &str, password: Option<&str>) -> Option<String> {
    if ssid.is_empty() {
        return None;
    }
    Some(match password.filter(|p| !p.is_empty()) {
        Some(password) => format!("WIFI:S:{ssid};H:false;T:WPA/WPA2;P:{password};;"),
        None => format!("WIFI:S:{ssid};H:false;T:nopass;;"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_uri_with_and_without_password() {
        assert_eq!(
            wifi_uri("Home", Some("hunter2")).as_deref(),
            Some("WIFI:S:Home;H:false;T:WPA/WPA2;P:hunter2;;")
        );
        assert_eq!(
            wifi_uri("Guest", None).as_deref(),
            Some("WIFI:S:Guest;H:false;T:nopass;;")
        );
        assert_eq!(
            wifi_uri("Guest", Some("")).as_deref(),
            Some("WIFI:S:Guest;H:false;T:nopass;;")
        );
        assert_eq!(wifi_uri("", Some("x")), None);
    }

    #[test]
    fn missing_url_names_the_resource() {
        let err = require_url(None, ResourceKind::Device, "42", "led_action").unwrap_err();
        assert_eq!(err.to_string(), "device 42 has no `led_action` resource URL");
    }
}
