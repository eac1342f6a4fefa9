use std::sync::Arc;

use crate::config::{Config, StoreKind};
use listwatch_core::{
    enrichment::DetailFetcher,
    events::Notifier,
    listing::Lister,
    utils::{Clock, SystemClock},
    CycleService, CycleServiceTrait, PersistFailurePolicy, WatchReport,
};
use listwatch_notify::{DiscordNotifier, LogNotifier};
use listwatch_scrape::{HtmlLister, HttpDetailFetcher};
use listwatch_storage::{JsonFileSnapshotStore, SqliteSnapshotStore};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Everything one watch cycle needs, wired for the configured backends.
pub struct Watcher {
    pub service: Arc<dyn CycleServiceTrait>,
    pub lister: Arc<dyn Lister>,
    pub notifier: Arc<dyn Notifier>,
    pub policy: PersistFailurePolicy,
}

impl Watcher {
    pub async fn run_once(&self) -> listwatch_core::Result<WatchReport> {
        self.service
            .watch_once(self.lister.as_ref(), self.notifier.as_ref(), self.policy)
            .await
    }
}

/// Installs the global subscriber. `LISTWATCH_LOG_FORMAT=json` switches to
/// JSON lines; anything else gives human-readable output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LISTWATCH_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_watcher(config: &Config) -> anyhow::Result<Watcher> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let fetcher: Arc<dyn DetailFetcher> = Arc::new(HttpDetailFetcher::new(config.http_timeout)?);
    let lister = Arc::new(HtmlLister::new(
        config.listing_url.clone(),
        config.base_url.clone(),
        config.http_timeout,
        clock.clone(),
    )?);

    let notifier: Arc<dyn Notifier> = match &config.discord_webhook_url {
        Some(url) => Arc::new(DiscordNotifier::new(url.clone(), config.http_timeout)),
        None => {
            tracing::warn!("DISCORD_WEBHOOK_URL not set; notifications go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let service: Arc<dyn CycleServiceTrait> = match config.store {
        StoreKind::Json => {
            let store = Arc::new(JsonFileSnapshotStore::new(&config.snapshot_path));
            Arc::new(CycleService::new(
                store,
                fetcher,
                config.watch.clone(),
                clock,
            )?)
        }
        StoreKind::Sqlite => {
            let store = Arc::new(SqliteSnapshotStore::open(&config.snapshot_path)?);
            Arc::new(CycleService::new(
                store,
                fetcher,
                config.watch.clone(),
                clock,
            )?)
        }
    };
    tracing::info!(
        "Snapshot store: {:?} at {}",
        config.store,
        config.snapshot_path.display()
    );

    Ok(Watcher {
        service,
        lister,
        notifier,
        policy: PersistFailurePolicy::from_send_flag(config.send_on_persist_failure),
    })
}
