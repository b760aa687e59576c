//! Watch handler: poll on an interval and print a per-network summary
//! whenever a new snapshot is published.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use eerosync_core::Account;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{self, or_dash, paint_status};

#[derive(Clone, Serialize, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Fetched")]
    fetched: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Eeros")]
    eeros: usize,
    #[tabled(rename = "Connected")]
    connected: usize,
    #[tabled(rename = "Guests")]
    guests: usize,
}

fn summary(account: &Account, color: bool) -> Vec<SummaryRow> {
    let fetched = or_dash(account.fetched_at().map(|t| t.format("%H:%M:%S").to_string()));
    account
        .networks()
        .into_iter()
        .map(|n| SummaryRow {
            fetched: fetched.clone(),
            network: n.name_unique(),
            status: paint_status(n.status().unwrap_or("-"), color),
            eeros: n.devices().len(),
            connected: n.connected_clients_count(),
            guests: n.connected_guest_clients_count(),
        })
        .collect()
}

fn print_summary(account: &Account, global: &GlobalOpts) {
    let rows = summary(account, output::should_color(&global.color));
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| {
        format!("{}\t{}\t{}", r.fetched, r.network, r.connected)
    });
    output::print_output(&out, global.quiet);
}

pub async fn handle(ctx: &Context, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let period = args.interval.map_or(ctx.scan_interval, Duration::from_secs);
    if period.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    // The first cycle runs in the foreground so login problems surface.
    let first = ctx.sync().await?;
    print_summary(&first, global);

    let mut updates = ctx.engine.subscribe();
    let cancel = CancellationToken::new();
    let poller = ctx
        .engine
        .spawn_polling(ctx.plan().clone(), period, cancel.clone());
    info!(interval_secs = period.as_secs(), "watching for changes");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_summary(&snapshot, global);
            }
        }
    }

    stop_poller(&cancel, poller).await;
    Ok(())
}

/// Cancel the poller and wait for it. Returns false if it panicked or was
/// aborted instead of stopping on its own.
async fn stop_poller(cancel: &CancellationToken, poller: JoinHandle<()>) -> bool {
    cancel.cancel();
    match poller.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "poller did not shut down cleanly");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use eerosync_core::Engine;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn stop_poller_reports_panicked_task() {
        let cancel = CancellationToken::new();
        let clean = tokio::spawn({
            let cancel = cancel.clone();
            async move { cancel.cancelled().await }
        });
        assert!(stop_poller(&cancel, clean).await);

        let panicked: JoinHandle<()> = tokio::spawn(async { panic!("poll loop failed") });
        assert!(!stop_poller(&CancellationToken::new(), panicked).await);
    }

    #[test]
    fn summary_counts_connected_and_guest_clients() {
        let engine = Engine::new(&eerosync_core::EngineConfig::default()).unwrap();
        let account = Account::from_data(
            Arc::clone(engine.session()),
            json!({
                "networks": { "data": [{
                    "url": "/2.2/networks/1",
                    "name": "Home",
                    "status": "connected",
                    "eeros": { "data": [{ "url": "/2.2/eeros/10", "location": "Hall" }] },
                    "devices": { "count": 3, "data": [
                        { "url": "/2.2/networks/1/devices/a", "connected": true, "is_guest": false },
                        { "url": "/2.2/networks/1/devices/b", "connected": true, "is_guest": true },
                        { "url": "/2.2/networks/1/devices/c", "connected": false, "is_guest": false }
                    ]}
                }]}
            }),
        );
        let rows = summary(&account, false);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.status, "connected");
        assert_eq!(row.eeros, 1);
        assert_eq!(row.connected, 2);
        assert_eq!(row.guests, 1);
    }
}
