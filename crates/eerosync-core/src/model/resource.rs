// ── Resource variants ──
//
// A closed set of entity kinds. Capability checks are pattern matches;
// derived display attributes are a fixed catalogue evaluated per variant.

use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString};

use super::account::Account;
use super::backup::BackupNetwork;
use super::client::Client;
use super::device::Device;
use super::network::Network;
use super::profile::Profile;

/// Entity kind, without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ResourceKind {
    Account,
    Network,
    BackupNetwork,
    Device,
    Profile,
    Client,
}

/// Any entity in a snapshot.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Account(&'a Account),
    Network(Network<'a>),
    BackupNetwork(BackupNetwork<'a>),
    Device(Device<'a>),
    Profile(Profile<'a>),
    Client(Client<'a>),
}

impl<'a> Resource<'a> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Account(_) => ResourceKind::Account,
            Self::Network(_) => ResourceKind::Network,
            Self::BackupNetwork(_) => ResourceKind::BackupNetwork,
            Self::Device(_) => ResourceKind::Device,
            Self::Profile(_) => ResourceKind::Profile,
            Self::Client(_) => ResourceKind::Client,
        }
    }

    pub fn is_account(&self) -> bool {
        matches!(self, Self::Account(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_backup_network(&self) -> bool {
        matches!(self, Self::BackupNetwork(_))
    }

    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }

    /// Only Beacon devices expose nightlight settings.
    pub fn is_beacon(&self) -> bool {
        matches!(self, Self::Device(d) if d.is_beacon())
    }

    pub fn is_profile(&self) -> bool {
        matches!(self, Self::Profile(_))
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Identifier derived from the canonical resource path.
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Self::Account(a) => a.id(),
            Self::Network(n) => Some(n.id()),
            Self::BackupNetwork(b) => b.id(),
            Self::Device(d) => Some(d.id()),
            Self::Profile(p) => Some(p.id()),
            Self::Client(c) => Some(c.id()),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Account(a) => a.name(),
            Self::Network(n) => n.name(),
            Self::BackupNetwork(b) => b.name(),
            Self::Device(d) => d.name(),
            Self::Profile(p) => p.name(),
            Self::Client(c) => c.name(),
        }
    }

    /// Owning network; `None` for the account and networks themselves.
    pub fn network(&self) -> Option<Network<'a>> {
        match self {
            Self::Account(_) | Self::Network(_) => None,
            Self::BackupNetwork(b) => Some(b.network()),
            Self::Device(d) => Some(d.network()),
            Self::Profile(p) => Some(p.network()),
            Self::Client(c) => Some(c.network()),
        }
    }
}

/// Extra attributes hosts show next to a resource's primary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DerivedAttribute {
    /// Sorted blocked-application list of a profile.
    BlockedApps,
    /// Receive channel width of a wireless client.
    BandwidthReceive,
    /// Transmit channel width of a wireless client.
    BandwidthTransmit,
    /// Radio channel of a wireless client.
    Channel,
    /// `"<frequency> <unit>"` of a wireless client.
    OperatingBand,
    /// Time of the network's last speed test.
    LastUpdated,
}

impl DerivedAttribute {
    /// Attributes that only make sense for wireless clients.
    pub fn wireless_only(self) -> bool {
        matches!(
            self,
            Self::BandwidthReceive | Self::BandwidthTransmit | Self::Channel | Self::OperatingBand
        )
    }

    /// Value of this attribute for `resource`, or `None` when it does not
    /// apply or the data is absent.
    pub fn evaluate(self, resource: &Resource<'_>) -> Option<Value> {
        match (self, resource) {
            (Self::BlockedApps, Resource::Profile(p)) => {
                let mut apps = p.blocked_applications();
                apps.sort_unstable();
                Some(json!(apps))
            }
            (Self::LastUpdated, Resource::Network(n)) => n.speed_date().map(Value::from),
            (_, Resource::Client(c)) if self.wireless_only() && c.wireless() != Some(true) => None,
            (Self::BandwidthReceive, Resource::Client(c)) => c.channel_width_rx().map(Value::from),
            (Self::BandwidthTransmit, Resource::Client(c)) => c.channel_width_tx().map(Value::from),
            (Self::Channel, Resource::Client(c)) => c.channel().map(Value::from),
            (Self::OperatingBand, Resource::Client(c)) => {
                let (frequency, unit) = c.interface_frequency();
                Some(Value::from(format!("{} {}", frequency?, unit?)))
            }
            _ => None,
        }
    }
}
