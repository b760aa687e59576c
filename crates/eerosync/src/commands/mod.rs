//! Command dispatch: bridges CLI args -> engine cycles and mutations ->
//! output formatting.

pub mod activity;
pub mod auth;
pub mod mutate;
pub mod show;
pub mod util;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use eerosync_config::{Config, Profile};
use eerosync_core::{Account, CoreError, Engine, SyncPlan};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// A sync cycle makes one request per resource; give it room for many.
const CYCLE_TIMEOUT_FACTOR: u32 = 10;

/// Everything a command needs: the engine for the active profile plus the
/// profile's sync plan and settings.
pub struct Context {
    pub engine: Engine,
    pub profile_name: String,
    pub profile: Profile,
    pub config: Config,
    pub scan_interval: Duration,
    cycle_timeout: Duration,
}

impl Context {
    /// Resolve the active profile, apply flag overrides and build the
    /// engine. Does not contact the service.
    pub fn from_global(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = eerosync_config::load_config_or_default();
        let profile_name = config.profile_name(global.profile.as_deref());
        let mut profile = config
            .profiles
            .get(&profile_name)
            .cloned()
            .unwrap_or_default();

        if let Some(ref url) = global.base_url {
            profile.base_url = Some(url.clone());
        }
        if let Some(timeout) = global.timeout {
            profile.timeout = Some(timeout);
        }
        if let Some(ref dir) = global.dump_dir {
            profile.dump_dir = Some(dir.clone());
        }

        let engine_config =
            eerosync_config::profile_to_engine_config(&profile, &profile_name, &config.defaults)?;
        let engine = Engine::new(&engine_config)?;

        let scan_interval =
            Duration::from_secs(profile.scan_interval.unwrap_or(config.defaults.scan_interval));
        let cycle_timeout = engine_config.timeout * CYCLE_TIMEOUT_FACTOR;

        Ok(Self {
            engine,
            profile_name,
            profile,
            config,
            scan_interval,
            cycle_timeout,
        })
    }

    pub fn plan(&self) -> &SyncPlan {
        &self.profile.networks
    }

    /// Run one cycle with the profile's plan.
    pub async fn sync(&self) -> Result<Arc<Account>, CliError> {
        self.sync_with(self.plan()).await
    }

    /// Run one cycle over the profile's networks with every sub-resource
    /// fetched, so a mutation can find its target.
    pub async fn sync_targets(&self) -> Result<Arc<Account>, CliError> {
        self.sync_with(&self.plan().with_every_resource()).await
    }

    /// Run one cycle with an explicit plan.
    pub async fn sync_with(&self, plan: &SyncPlan) -> Result<Arc<Account>, CliError> {
        self.engine
            .update_with_timeout(plan, self.cycle_timeout)
            .await
            .map_err(|e| self.cycle_error(e))
    }

    /// Any cycle failure that is not about the session reads as the
    /// service being unreachable.
    pub fn cycle_error(&self, err: CoreError) -> CliError {
        match err {
            CoreError::NotAuthenticated => CliError::NotLoggedIn {
                profile: self.profile_name.clone(),
            },
            e if e.is_auth_failure() => CliError::from(e),
            e @ CoreError::CycleTimeout { .. } => CliError::from(e),
            e => CliError::SyncFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args, global).await,
        Command::Account => show::account(ctx, global).await,
        Command::Networks(args) => show::networks(ctx, args, global).await,
        Command::Devices(args) => show::devices(ctx, args, global).await,
        Command::Clients(args) => show::clients(ctx, args, global).await,
        Command::Profiles(args) => show::profiles(ctx, args, global).await,
        Command::Backups(args) => show::backups(ctx, args, global).await,
        Command::Activity(args) => activity::handle(ctx, args, global).await,
        Command::Set(args) => mutate::set(ctx, args, global).await,
        Command::Reboot(args) => mutate::reboot(ctx, args, global).await,
        Command::Update { network } => mutate::run_update(ctx, &network, global).await,
        Command::Watch(args) => watch::handle(ctx, args, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
