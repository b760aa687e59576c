//! Mutation handlers. Each one syncs the profile's networks in full to
//! locate its target, then issues a single remote call; the next sync
//! shows the effect.

use serde_json::Value;

use eerosync_core::NightlightMode;

use crate::cli::{GlobalOpts, NightlightCommand, RebootArgs, RebootCommand, SetArgs, SetCommand};
use crate::commands::{Context, util};
use crate::error::CliError;

pub async fn set(ctx: &Context, args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync_targets().await?;

    let (what, applied) = match args.command {
        SetCommand::Network {
            network,
            setting,
            state,
        } => {
            let n = util::network(&account, &network)?;
            (
                format!("network {network} {setting}"),
                n.set(setting, state.enabled()).await?,
            )
        }

        SetCommand::UpdateHour { network, label } => {
            let n = util::network(&account, &network)?;
            let applied = n.set_preferred_update_hour(&label).await?;
            if !applied {
                let options: Vec<&str> = n.preferred_update_hour_options().collect();
                return Err(CliError::Validation {
                    field: "label".into(),
                    reason: format!("expected one of: {}", options.join(", ")),
                });
            }
            (format!("network {network} update hour"), applied)
        }

        SetCommand::Profile {
            profile,
            setting,
            state,
        } => {
            let p = util::profile(&account, &profile)?;
            (
                format!("profile {profile} {setting}"),
                p.set(setting, state.enabled()).await?,
            )
        }

        SetCommand::BlockedApps { profile, apps } => {
            let p = util::profile(&account, &profile)?;
            let apps: Vec<Value> = apps.into_iter().map(Value::from).collect();
            (
                format!("profile {profile} blocked applications"),
                p.set_blocked_applications(apps).await?,
            )
        }

        SetCommand::ClientPaused { client, state } => {
            let c = util::client(&account, &client)?;
            (
                format!("client {client} paused"),
                c.set_paused(state.enabled()).await?,
            )
        }

        SetCommand::StatusLight { device, state } => {
            let d = util::device(&account, &device)?;
            (
                format!("eero {device} status light"),
                d.set_status_light(state.enabled()).await?,
            )
        }

        SetCommand::StatusLightBrightness { device, percent } => {
            let d = util::device(&account, &device)?;
            (
                format!("eero {device} status light brightness"),
                d.set_status_light_brightness(percent).await?,
            )
        }

        SetCommand::Nightlight(args) => {
            let device = args.device;
            let d = util::device(&account, &device)?;
            let light = d.nightlight().ok_or_else(|| CliError::Validation {
                field: "device".into(),
                reason: format!("eero {device} is not a Beacon and has no nightlight"),
            })?;
            let applied = match args.command {
                NightlightCommand::Mode { mode } => {
                    if mode == NightlightMode::Scheduled && light.schedule_on().is_none() {
                        return Err(CliError::Validation {
                            field: "mode".into(),
                            reason: "no schedule stored yet; set one with `nightlight schedule`"
                                .into(),
                        });
                    }
                    light.set_mode(mode).await?
                }
                NightlightCommand::Schedule { on, off } => {
                    light
                        .set_schedule(
                            on.format("%H:%M").to_string(),
                            off.format("%H:%M").to_string(),
                        )
                        .await?
                }
                NightlightCommand::Brightness { percent } => light.set_brightness(percent).await?,
            };
            (format!("eero {device} nightlight"), applied)
        }

        SetCommand::BackupAutoJoin { backup, state } => {
            let b = util::backup(&account, &backup)?;
            (
                format!("backup network {backup} auto-join"),
                b.set_auto_join(state.enabled()).await?,
            )
        }
    };

    util::report(applied, &what, global.quiet)
}

pub async fn reboot(ctx: &Context, args: RebootArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync_targets().await?;
    let (what, applied) = match args.command {
        RebootCommand::Network { network } => {
            let n = util::network(&account, &network)?;
            let prompt = format!("Reboot every eero on network '{}'?", n.name_unique());
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            (format!("network {network} reboot"), n.reboot().await?)
        }
        RebootCommand::Device { device } => {
            let d = util::device(&account, &device)?;
            let prompt = format!("Reboot {}?", d.name_long());
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            (format!("eero {device} reboot"), d.reboot().await?)
        }
    };
    util::report(applied, &what, global.quiet)
}

pub async fn run_update(ctx: &Context, network: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let account = ctx.sync_targets().await?;
    let n = util::network(&account, network)?;
    let target = n.target_firmware();
    let prompt = format!(
        "Install firmware {} on network '{}'?",
        target.os_version().unwrap_or("update"),
        n.name_unique()
    );
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }
    let applied = n.run_update().await?;
    util::report(applied, &format!("network {network} update"), global.quiet)
}
