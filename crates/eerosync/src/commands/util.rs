//! Shared helpers for command handlers.

use eerosync_core::{
    Account, BackupNetwork, Client, Device, Network, Profile, Resource, ResourceKind,
};

use crate::cli::ListArgs;
use crate::error::CliError;

fn not_found(kind: ResourceKind, identifier: &str, list_command: &str) -> CliError {
    CliError::NotFound {
        resource_type: kind.to_string(),
        identifier: identifier.into(),
        list_command: list_command.into(),
    }
}

pub fn network<'a>(account: &'a Account, id: &str) -> Result<Network<'a>, CliError> {
    account
        .network(id)
        .ok_or_else(|| not_found(ResourceKind::Network, id, "networks list"))
}

pub fn device<'a>(account: &'a Account, id: &str) -> Result<Device<'a>, CliError> {
    match account.find(ResourceKind::Device, id) {
        Some(Resource::Device(d)) => Ok(d),
        _ => Err(not_found(ResourceKind::Device, id, "devices list")),
    }
}

pub fn client<'a>(account: &'a Account, id: &str) -> Result<Client<'a>, CliError> {
    match account.find(ResourceKind::Client, id) {
        Some(Resource::Client(c)) => Ok(c),
        _ => Err(not_found(ResourceKind::Client, id, "clients list")),
    }
}

pub fn profile<'a>(account: &'a Account, id: &str) -> Result<Profile<'a>, CliError> {
    match account.find(ResourceKind::Profile, id) {
        Some(Resource::Profile(p)) => Ok(p),
        _ => Err(not_found(ResourceKind::Profile, id, "profiles list")),
    }
}

pub fn backup<'a>(account: &'a Account, id: &str) -> Result<BackupNetwork<'a>, CliError> {
    match account.find(ResourceKind::BackupNetwork, id) {
        Some(Resource::BackupNetwork(b)) => Ok(b),
        _ => Err(not_found(ResourceKind::BackupNetwork, id, "backups list")),
    }
}

/// Networks a list command covers: the `--network` one, or all.
pub fn networks<'a>(account: &'a Account, list: &ListArgs) -> Result<Vec<Network<'a>>, CliError> {
    match list.network.as_deref() {
        Some(id) => Ok(vec![network(account, id)?]),
        None => Ok(account.networks()),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Report the outcome of a mutation. `false` means the value was ignored
/// before any request went out.
pub fn report(applied: bool, what: &str, quiet: bool) -> Result<(), CliError> {
    if !applied {
        return Err(CliError::NotApplied {
            reason: format!("{what}: value not accepted"),
        });
    }
    if !quiet {
        eprintln!("{what}: done");
    }
    Ok(())
}
