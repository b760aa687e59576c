// ── Account snapshot ──
//
// Root of the resource tree. Owns the raw account payload (with the
// assembled network payloads spliced into `networks.data`); every other
// view borrows from it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eerosync_api::Session;
use eerosync_api::session::ACCOUNT_PATH;
use serde_json::Value;

use super::network::Network;
use super::raw::{list_at, str_at};
use super::resource::{Resource, ResourceKind};

/// Immutable snapshot of one account and everything fetched under it.
#[derive(Debug, Clone)]
pub struct Account {
    session: Arc<Session>,
    data: Value,
    fetched_at: Option<DateTime<Utc>>,
}

impl Account {
    /// A snapshot with no data, used before the first successful cycle.
    pub fn empty(session: Arc<Session>) -> Self {
        Self {
            session,
            data: Value::Null,
            fetched_at: None,
        }
    }

    pub fn from_data(session: Arc<Session>, data: Value) -> Self {
        Self {
            session,
            data,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// When the snapshot was assembled; `None` for [`Account::empty`].
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_null()
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn url(&self) -> &str {
        ACCOUNT_PATH
    }

    /// The account's log id.
    pub fn id(&self) -> Option<&str> {
        self.log_id()
    }

    pub fn log_id(&self) -> Option<&str> {
        str_at(&self.data, &["log_id"])
    }

    pub fn name(&self) -> Option<&str> {
        str_at(&self.data, &["name"])
    }

    pub fn email(&self) -> Option<&str> {
        str_at(&self.data, &["email", "value"])
    }

    pub fn phone(&self) -> Option<&str> {
        str_at(&self.data, &["phone", "value"])
    }

    pub fn premium_status(&self) -> Option<&str> {
        str_at(&self.data, &["premium_status"])
    }

    // ── Tree navigation ──────────────────────────────────────────────

    pub(crate) fn network_data(&self) -> &[Value] {
        list_at(&self.data, &["networks", "data"])
    }

    pub fn networks(&self) -> Vec<Network<'_>> {
        (0..self.network_data().len())
            .map(|index| Network::new(self, index))
            .collect()
    }

    pub fn network(&self, id: &str) -> Option<Network<'_>> {
        self.networks().into_iter().find(|n| n.id() == id)
    }

    /// Every entity in the tree, the account first, then each network
    /// followed by its sub-resources.
    pub fn resources(&self) -> Vec<Resource<'_>> {
        let mut all = vec![Resource::Account(self)];
        for network in self.networks() {
            all.push(Resource::Network(network));
            all.extend(network.resources());
        }
        all
    }

    /// Find an entity by kind and id.
    pub fn find(&self, kind: ResourceKind, id: &str) -> Option<Resource<'_>> {
        self.resources()
            .into_iter()
            .find(|r| r.kind() == kind && r.id() == Some(id))
    }
}
