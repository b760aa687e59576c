//! Activity handler: fetch one series for one scope and print the
//! per-resource counters read back from the snapshot.

use serde::Serialize;
use tabled::Tabled;

use eerosync_core::{
    Account, Activity, ActivityScope, DataUsage, InsightType, NetworkSelection, SyncPlan,
};

use crate::cli::{ActivityArgs, GlobalOpts};
use crate::commands::{Context, util};
use crate::error::CliError;
use crate::output::{self, or_dash};

#[derive(Clone, Serialize, Tabled)]
struct ActivityRow {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn usage_text(usage: DataUsage) -> String {
    match usage.total() {
        Some(_) => format!("{} down / {} up", or_dash(usage.download), or_dash(usage.upload)),
        None => "-".into(),
    }
}

/// Counter for `activity`, read with `insight` for insight series and
/// `usage` for data-usage series.
fn counter(
    activity: Activity,
    insight: impl Fn(InsightType) -> Option<u64>,
    usage: impl Fn() -> DataUsage,
) -> String {
    match activity.insight_type() {
        Some(kind) => or_dash(insight(kind)),
        None => usage_text(usage()),
    }
}

/// Selection fetching `activity` for `scope`, plus whatever that scope's
/// resources need to be listed at all.
fn selection(args: &ActivityArgs) -> NetworkSelection {
    let mut selection =
        NetworkSelection::default().with_activity(args.scope, [args.activity]);
    selection.devices = args.scope == ActivityScope::Clients;
    selection.profiles = args.scope == ActivityScope::Profiles;
    selection.profile_ids.clone_from(&args.profile_ids);
    selection
}

fn rows(account: &Account, args: &ActivityArgs) -> Vec<ActivityRow> {
    let activity = args.activity;
    let mut rows = Vec::new();
    for n in account.networks() {
        let network = n.id().to_owned();
        let mut push = |kind: &str, id: &str, name: Option<&str>, value: String| {
            rows.push(ActivityRow {
                network: network.clone(),
                kind: kind.into(),
                id: id.into(),
                name: or_dash(name),
                value,
            });
        };
        match args.scope {
            ActivityScope::Network => {
                let value = counter(
                    activity,
                    |kind| match kind {
                        InsightType::Adblock => n.adblock(activity),
                        InsightType::Blocked => n.blocked(activity).blocked,
                        InsightType::Inspected => n.inspected(activity),
                    },
                    || n.data_usage(activity),
                );
                push("network", n.id(), n.name(), value);
            }
            ActivityScope::Eeros => {
                for d in n.devices() {
                    let value = counter(activity, |_| None, || d.data_usage(activity));
                    push("device", d.id(), d.name(), value);
                }
            }
            ActivityScope::Profiles => {
                for p in n.profiles() {
                    if !args.profile_ids.iter().any(|id| id == p.id()) {
                        continue;
                    }
                    let value = counter(
                        activity,
                        |kind| match kind {
                            InsightType::Adblock => p.adblock(activity),
                            InsightType::Blocked => p.blocked(activity),
                            InsightType::Inspected => p.inspected(activity),
                        },
                        || p.data_usage(activity),
                    );
                    push("profile", p.id(), p.name(), value);
                }
            }
            ActivityScope::Clients => {
                for c in n.clients() {
                    let value = counter(
                        activity,
                        |kind| match kind {
                            InsightType::Adblock => c.adblock(activity),
                            InsightType::Blocked => c.blocked(activity),
                            InsightType::Inspected => c.inspected(activity),
                        },
                        || c.data_usage(activity),
                    );
                    push("client", c.id(), c.name(), value);
                }
            }
        }
    }
    rows
}

pub async fn handle(ctx: &Context, args: ActivityArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.scope == ActivityScope::Profiles && args.profile_ids.is_empty() {
        return Err(CliError::Validation {
            field: "profile-id".into(),
            reason: "the profiles scope needs at least one --profile-id".into(),
        });
    }

    let network_ids: Vec<String> = match args.network.as_deref() {
        Some(id) => vec![id.to_owned()],
        None => ctx
            .sync_with(&SyncPlan::all())
            .await?
            .networks()
            .iter()
            .map(|n| n.id().to_owned())
            .collect(),
    };

    let selection = selection(&args);
    let plan = network_ids
        .into_iter()
        .fold(SyncPlan::default(), |plan, id| plan.with_network(id, selection.clone()));
    let account = ctx.sync_with(&plan).await?;
    if let Some(id) = args.network.as_deref() {
        util::network(&account, id)?;
    }

    let rows = rows(&account, &args);
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| {
        format!("{}\t{}", r.id, r.value)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
