// ── Sync engine ──
//
// Owns the session and the latest account snapshot. A sync cycle walks
// the account, fetches the selected sub-resources of each selected
// network strictly in order, and swaps in a new snapshot only when every
// call succeeded.

use std::sync::Arc;
use std::time::Duration;

use eerosync_api::session::ACCOUNT_PATH;
use eerosync_api::{Session, TransportConfig};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activity::{ActivityScope, activity_path, activity_query, extract_series};
use crate::config::{EngineConfig, NetworkSelection, SyncPlan};
use crate::error::CoreError;
use crate::model::Account;
use crate::model::network::{backup_access_point_ok, premium_ok};
use crate::window::window;

const NETWORK_PATH_PREFIX: &str = "/2.2/networks/";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Identifiers returned by a successful login verification.
#[derive(Debug, Clone)]
pub struct VerifiedLogin {
    pub user_token: SecretString,
    pub log_id: Option<String>,
    pub name: Option<String>,
}

/// Sync engine for one eero account.
///
/// Cheaply cloneable; clones share the session, the cycle lock and the
/// published snapshot.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    session: Arc<Session>,
    /// Held for the whole of a sync cycle.
    cycle: Mutex<()>,
    snapshot: watch::Sender<Arc<Account>>,
}

impl Engine {
    /// Build an engine (and its session) from configuration. Does not
    /// contact the service.
    pub fn new(config: &EngineConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            dump_dir: config.dump_dir.clone(),
        };
        let session = Session::new(&transport)?;
        if let Some(token) = &config.user_token {
            session.set_token(Some(token.clone()));
        }
        Ok(Self::with_session(Arc::new(session)))
    }

    /// Wrap an existing session.
    pub fn with_session(session: Arc<Session>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Account::empty(Arc::clone(&session))));
        Self {
            inner: Arc::new(EngineInner {
                session,
                cycle: Mutex::new(()),
                snapshot,
            }),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    // ── Login ────────────────────────────────────────────────────────

    /// Request a verification code for an email address or phone number.
    pub async fn login(&self, identifier: &str) -> Result<(), CoreError> {
        self.inner.session.login(identifier).await?;
        info!("verification code requested");
        Ok(())
    }

    /// Confirm the login started by [`login`](Self::login). The session
    /// keeps the verified token: `user_token` from the response when
    /// present, otherwise the provisional one.
    pub async fn verify(&self, code: &str) -> Result<VerifiedLogin, CoreError> {
        let session = &self.inner.session;
        let data = session.login_verify(code).await?;
        if let Some(token) = data.get("user_token").and_then(Value::as_str) {
            session.set_token(Some(SecretString::from(token.to_owned())));
        }
        let user_token = session.token().ok_or(CoreError::NotAuthenticated)?;

        let text = |key: &str| data.get(key).and_then(Value::as_str).map(String::from);
        info!("login verified");
        Ok(VerifiedLogin {
            user_token,
            log_id: text("log_id"),
            name: text("name"),
        })
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// The latest successful snapshot (empty before the first one).
    pub fn snapshot(&self) -> Arc<Account> {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Account>> {
        self.inner.snapshot.subscribe()
    }

    // ── Sync cycles ──────────────────────────────────────────────────

    /// Run a cycle and return the resulting snapshot. On failure the
    /// failure is logged and the previous snapshot is returned.
    pub async fn update(&self, plan: &SyncPlan) -> Arc<Account> {
        match self.try_update(plan).await {
            Ok(account) => account,
            Err(e) => {
                warn!(error = %e, "sync cycle failed, keeping previous snapshot");
                self.snapshot()
            }
        }
    }

    /// Run a cycle, surfacing the failure. The previous snapshot stays
    /// published on error.
    pub async fn try_update(&self, plan: &SyncPlan) -> Result<Arc<Account>, CoreError> {
        let _cycle = self.inner.cycle.lock().await;
        let session = &self.inner.session;
        if !session.is_authenticated() {
            return Err(CoreError::NotAuthenticated);
        }

        let mut account = session.get(ACCOUNT_PATH).await?;
        let listed = account
            .pointer("/networks/data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut networks = Vec::new();
        for entry in &listed {
            let Some(url) = entry.get("url").and_then(Value::as_str) else {
                continue;
            };
            let id = url.strip_prefix(NETWORK_PATH_PREFIX).unwrap_or(url);
            let Some(selection) = plan.selection_for(id) else {
                debug!(network = id, "not selected, skipping");
                continue;
            };
            networks.push(fetch_network(session, url, &selection).await?);
        }

        if let Some(list) = account.pointer_mut("/networks/data") {
            *list = Value::Array(networks);
        }
        session.save_response("update_data", &account);

        let snapshot = Arc::new(Account::from_data(Arc::clone(session), account));
        info!(networks = snapshot.networks().len(), "sync cycle complete");
        self.inner.snapshot.send_replace(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// [`try_update`](Self::try_update) bounded by `timeout`. An abandoned
    /// cycle leaves the previous snapshot in place.
    pub async fn update_with_timeout(
        &self,
        plan: &SyncPlan,
        timeout: Duration,
    ) -> Result<Arc<Account>, CoreError> {
        tokio::time::timeout(timeout, self.try_update(plan))
            .await
            .map_err(|_| CoreError::CycleTimeout {
                timeout_secs: timeout.as_secs(),
            })?
    }

    /// Re-run `plan` every `period` until `cancel` fires. The first cycle
    /// runs one period after spawning.
    pub fn spawn_polling(
        &self,
        plan: SyncPlan,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(polling_task(self.clone(), plan, period, cancel))
    }
}

async fn polling_task(engine: Engine, plan: SyncPlan, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = engine.try_update(&plan).await {
                    warn!(error = %e, "periodic sync failed");
                }
            }
        }
    }
}

// ── Per-network assembly ─────────────────────────────────────────────

/// Fetch one network and the sub-resources `selection` asks for,
/// splicing them into the network payload under their fixed keys.
async fn fetch_network(
    session: &Session,
    url: &str,
    selection: &NetworkSelection,
) -> Result<Value, CoreError> {
    debug!(network = url, "fetching network");
    let mut network = session.get(url).await?;

    let thread_url = resource_url(&network, "thread", url);
    let thread = session.get(&thread_url).await?;
    insert(&mut network, "thread", thread);

    if selection.backup_access_points
        && backup_access_point_ok(&network)
        && premium_ok(&network)
    {
        let backups = session.get(&format!("{url}/backup_access_points")).await?;
        insert(&mut network, "backup_access_points", counted(backups));
    }

    if selection.devices {
        let devices = session.get(&resource_url(&network, "devices", url)).await?;
        insert(&mut network, "devices", counted(devices));
    }

    if selection.profiles {
        let profiles = session.get(&resource_url(&network, "profiles", url)).await?;
        insert(&mut network, "profiles", counted(profiles));
    }

    if selection.release_notes {
        let manifest = network
            .pointer("/updates/manifest_resource")
            .and_then(Value::as_str)
            .map(String::from);
        if let Some(manifest) = manifest {
            let notes = match session.release_notes(&manifest).await {
                Ok(notes) => notes,
                Err(e) => {
                    warn!(error = %e, "release notes unavailable");
                    Value::Null
                }
            };
            if let Some(Value::Object(updates)) = network.get_mut("updates") {
                updates.insert("release_notes".into(), notes);
            }
        }
    }

    let activity = fetch_activity(session, url, &network, selection).await?;
    insert(&mut network, "activity", activity);
    Ok(network)
}

/// Fetch every selected activity series, keyed `scope -> activity`, with
/// profile-scoped series nested one level deeper by profile id.
async fn fetch_activity(
    session: &Session,
    url: &str,
    network: &Value,
    selection: &NetworkSelection,
) -> Result<Value, CoreError> {
    let timezone = network
        .pointer("/timezone/value")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TIMEZONE);

    let mut by_scope = Map::new();
    for (scope, activity) in selection.activities() {
        let window = window(activity.period(), timezone);
        let query = activity_query(&window, timezone, activity);

        let series = if scope == ActivityScope::Profiles {
            let mut by_profile = Map::new();
            for profile_id in &selection.profile_ids {
                let path = activity_path(url, activity, scope, Some(profile_id));
                let data = session.get_with_body(&path, &query).await?;
                by_profile.insert(profile_id.clone(), extract_series(&data));
            }
            Value::Object(by_profile)
        } else {
            let path = activity_path(url, activity, scope, None);
            let data = session.get_with_body(&path, &query).await?;
            extract_series(&data)
        };

        let stored = by_scope
            .entry(scope.data_key())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = stored {
            map.insert(activity.key().into(), series);
        }
    }
    Ok(Value::Object(by_scope))
}

/// `resources.<name>` of a network payload, or `<network-url>/<name>`.
fn resource_url(network: &Value, name: &str, network_url: &str) -> String {
    network
        .get("resources")
        .and_then(|r| r.get(name))
        .and_then(Value::as_str)
        .map_or_else(|| format!("{network_url}/{name}"), String::from)
}

/// `{count, data}` wrapper stored for list resources.
fn counted(list: Value) -> Value {
    let count = list.as_array().map_or(0, Vec::len);
    json!({ "count": count, "data": list })
}

fn insert(network: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = network {
        map.insert(key.into(), value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resource_url_falls_back_to_network_path() {
        let network = json!({ "resources": { "devices": "/2.2/networks/1/devices" } });
        assert_eq!(
            resource_url(&network, "devices", "/2.2/networks/1"),
            "/2.2/networks/1/devices"
        );
        assert_eq!(
            resource_url(&network, "thread", "/2.2/networks/1"),
            "/2.2/networks/1/thread"
        );
    }

    #[test]
    fn counted_wraps_lists() {
        assert_eq!(
            counted(json!([{ "a": 1 }, { "a": 2 }])),
            json!({ "count": 2, "data": [{ "a": 1 }, { "a": 2 }] })
        );
        assert_eq!(counted(Value::Null), json!({ "count": 0, "data": null }));
    }
}
