use eerosync_api::Method;
use serde_json::{Value, json};

use crate::error::CoreError;

use super::network::Network;
use super::raw::{bool_at, str_at};
use super::{issue, wifi_uri};

/// A backup access point (fallback Wi-Fi uplink) configured on a network.
#[derive(Debug, Clone, Copy)]
pub struct BackupNetwork<'a> {
    network: Network<'a>,
    data: &'a Value,
}

impl<'a> BackupNetwork<'a> {
    pub(crate) fn new(network: Network<'a>, data: &'a Value) -> Self {
        Self { network, data }
    }

    pub fn network(&self) -> Network<'a> {
        self.network
    }

    pub fn data(&self) -> &'a Value {
        self.data
    }

    pub fn uuid(&self) -> Option<&'a str> {
        str_at(self.data, &["uuid"])
    }

    pub fn id(&self) -> Option<&'a str> {
        self.uuid()
    }

    pub fn url(&self) -> String {
        format!(
            "{}/backup_access_points/{}",
            self.network.url(),
            self.uuid().unwrap_or_default()
        )
    }

    pub fn ssid(&self) -> Option<&'a str> {
        str_at(self.data, &["ssid"])
    }

    pub fn name(&self) -> Option<&'a str> {
        self.ssid()
    }

    pub fn password(&self) -> Option<&'a str> {
        str_at(self.data, &["password"])
    }

    pub fn wifi_uri(&self) -> Option<String> {
        wifi_uri(self.ssid()?, self.password())
    }

    pub fn auto_join_enabled(&self) -> Option<bool> {
        bool_at(self.data, &["enabled"])
    }

    pub fn created(&self) -> Option<&'a str> {
        str_at(self.data, &["created"])
    }

    pub fn last_updated_at(&self) -> Option<&'a str> {
        str_at(self.data, &["last_updated_at"])
    }

    pub fn backup_access_point_id(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "backup_access_point_id"])
    }

    pub fn checked(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "checked"])
    }

    pub fn failure_reason(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "failure_reason"])
    }

    pub fn status(&self) -> Option<&'a str> {
        str_at(self.data, &["connectivity", "status"])
    }

    /// The service wants the credentials echoed back with the flag.
    pub async fn set_auto_join(&self, value: impl Into<Value>) -> Result<bool, CoreError> {
        let Some(enabled) = value.into().as_bool() else {
            return Ok(false);
        };
        issue(
            self.network.session(),
            Method::PUT,
            &self.url(),
            Some(json!({
                "enabled": enabled,
                "ssid": self.ssid(),
                "password": self.password(),
            })),
        )
        .await
    }
}
