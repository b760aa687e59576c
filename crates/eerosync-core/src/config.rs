// ── Runtime sync configuration ──
//
// What the engine talks to and which parts of each network a cycle
// fetches. Built by the host (the CLI reads it from a profile); core
// never touches disk for it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::activity::{Activity, ActivityScope};

/// Connection settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// API host (`https://api-user.e2ro.com` in production).
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Previously verified session token.
    pub user_token: Option<SecretString>,
    /// Directory for raw response dumps.
    pub dump_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: eerosync_api::transport::default_base_url(),
            timeout: Duration::from_secs(30),
            user_token: None,
            dump_dir: None,
        }
    }
}

/// Per-network selection of what a sync cycle fetches.
///
/// Every flag defaults to off; [`NetworkSelection::everything`] is what a
/// network gets when the plan names no networks at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSelection {
    /// Fetch backup access points (still subject to capability checks).
    pub backup_access_points: bool,
    /// Fetch the network's `devices` resource, i.e. its clients.
    pub devices: bool,
    /// Fetch profiles.
    pub profiles: bool,
    /// Fetch firmware release notes from the update manifest.
    pub release_notes: bool,
    /// Profile ids that profile-scoped activity fans out over.
    pub profile_ids: Vec<String>,
    /// Activity series to fetch, per scope.
    pub activity: BTreeMap<ActivityScope, BTreeSet<Activity>>,
}

impl NetworkSelection {
    /// Backup access points, devices and profiles; no release notes or
    /// activity.
    pub fn everything() -> Self {
        Self {
            backup_access_points: true,
            devices: true,
            profiles: true,
            ..Self::default()
        }
    }

    pub fn with_activity(
        mut self,
        scope: ActivityScope,
        activities: impl IntoIterator<Item = Activity>,
    ) -> Self {
        self.activity.entry(scope).or_default().extend(activities);
        self
    }

    /// `(scope, activity)` pairs in a stable order.
    pub fn activities(&self) -> impl Iterator<Item = (ActivityScope, Activity)> + '_ {
        self.activity
            .iter()
            .flat_map(|(scope, set)| set.iter().map(move |activity| (*scope, *activity)))
    }
}

/// Which networks a sync cycle covers, keyed by network id.
///
/// An empty plan covers every network with [`NetworkSelection::everything`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncPlan {
    pub networks: BTreeMap<String, NetworkSelection>,
}

impl SyncPlan {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, id: impl Into<String>, selection: NetworkSelection) -> Self {
        self.networks.insert(id.into(), selection);
        self
    }

    /// The same networks, each fetched with [`NetworkSelection::everything`]
    /// so every sub-resource can be looked up.
    pub fn with_every_resource(&self) -> Self {
        Self {
            networks: self
                .networks
                .keys()
                .map(|id| (id.clone(), NetworkSelection::everything()))
                .collect(),
        }
    }

    /// Selection for a network, or `None` if the plan skips it.
    pub fn selection_for(&self, network_id: &str) -> Option<NetworkSelection> {
        if self.networks.is_empty() {
            return Some(NetworkSelection::everything());
        }
        self.networks.get(network_id).cloned()
    }
}
