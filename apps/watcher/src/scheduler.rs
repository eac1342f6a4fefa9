use std::future::Future;
use std::time::Duration;

use listwatch_core::Error;
use tokio::time::{interval, MissedTickBehavior};

use crate::main_lib::Watcher;

/// Runs a cycle immediately, then once per `period`, until `shutdown`
/// resolves. A cycle in progress always finishes before the loop exits.
pub async fn run_watch_loop<F>(watcher: &Watcher, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Watch loop started, interval {}s", period.as_secs());
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping watch loop");
                break;
            }
            _ = ticker.tick() => {}
        }
        run_scheduled_cycle(watcher).await;
    }
}

async fn run_scheduled_cycle(watcher: &Watcher) {
    match watcher.run_once().await {
        Ok(report) => tracing::info!(
            "Cycle complete: {} candidate(s), {} notification(s), {} sent, {} failed",
            report.candidates,
            report.notifications.total(),
            report.dispatch.sent,
            report.dispatch.failed
        ),
        Err(Error::Listing(e)) => {
            tracing::warn!("Listing unavailable, skipping this cycle: {}", e)
        }
        Err(e) => tracing::error!("Watch cycle failed: {}", e),
    }
}
