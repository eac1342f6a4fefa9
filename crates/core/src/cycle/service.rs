use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::WatchConfig;
use crate::diff::{apply_closing_resets, carry_forward_flags, compute_notifications};
use crate::enrichment::{DetailFetcher, EnrichmentScheduler};
use crate::errors::{CycleError, Result};
use crate::events::{dispatch, DispatchReport, Notifications, Notifier};
use crate::items::Item;
use crate::listing::Lister;
use crate::snapshot::{find_duplicate_identities, SnapshotStore};
use crate::throttle::Throttle;
use crate::utils::Clock;

// =============================================================================
// Types
// =============================================================================

/// What to do with computed notifications when the snapshot save fails.
///
/// Sending them means the notified flags did not stick, so the same events
/// will fire again next cycle. Suppressing them risks losing them entirely
/// if the store stays broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistFailurePolicy {
    #[default]
    Suppress,
    SendAnyway,
}

impl PersistFailurePolicy {
    pub fn from_send_flag(send: bool) -> Self {
        if send {
            PersistFailurePolicy::SendAnyway
        } else {
            PersistFailurePolicy::Suppress
        }
    }
}

/// Result of a full watch cycle.
#[derive(Debug, Clone, Default)]
pub struct WatchReport {
    /// Candidates returned by the lister.
    pub candidates: usize,
    pub notifications: Notifications,
    pub dispatch: DispatchReport,
}

// =============================================================================
// Service Trait
// =============================================================================

/// Trait for the watch cycle service.
#[async_trait]
pub trait CycleServiceTrait: Send + Sync {
    /// Runs the enrichment and diff pipeline over `candidates`.
    ///
    /// On success the full enriched list has been saved exactly once. An empty
    /// candidate list is a no-op: nothing is loaded or saved.
    async fn run_cycle(&self, candidates: Vec<Item>) -> std::result::Result<Notifications, CycleError>;

    /// Fetches candidates from `lister`, runs the cycle and sends the
    /// resulting events through `notifier`.
    ///
    /// A listing failure skips the cycle entirely. A persistence failure
    /// follows `policy` for sending and is then returned as an error.
    async fn watch_once(
        &self,
        lister: &dyn Lister,
        notifier: &dyn Notifier,
        policy: PersistFailurePolicy,
    ) -> Result<WatchReport>;
}

// =============================================================================
// Cycle Service
// =============================================================================

/// Watch cycle service.
///
/// Owns one [`Throttle`] for its whole lifetime, so rate spacing and the
/// concurrency bound hold across cycle boundaries, not just within a cycle.
pub struct CycleService<S>
where
    S: SnapshotStore,
{
    store: Arc<S>,
    scheduler: EnrichmentScheduler,
    config: WatchConfig,
}

impl<S> CycleService<S>
where
    S: SnapshotStore + 'static,
{
    /// Create a new cycle service. Fails when `config` does not validate.
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn DetailFetcher>,
        config: WatchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let throttle = Throttle::from_config(&config);
        Self::with_throttle(store, fetcher, throttle, config, clock)
    }

    /// Like [`new`](Self::new), with an externally built throttle.
    pub fn with_throttle(
        store: Arc<S>,
        fetcher: Arc<dyn DetailFetcher>,
        throttle: Throttle,
        config: WatchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let scheduler = EnrichmentScheduler::new(fetcher, throttle, config.clone(), clock);
        Ok(Self {
            store,
            scheduler,
            config,
        })
    }
}

#[async_trait]
impl<S> CycleServiceTrait for CycleService<S>
where
    S: SnapshotStore + 'static,
{
    async fn run_cycle(&self, candidates: Vec<Item>) -> std::result::Result<Notifications, CycleError> {
        if candidates.is_empty() {
            info!("Empty candidate list, skipping cycle");
            return Ok(Notifications::default());
        }

        for identity in find_duplicate_identities(&candidates) {
            warn!("Duplicate identity in candidate list: {}", identity);
        }

        let prior = self.store.load().await.map_err(CycleError::Load)?;
        debug!(
            "Loaded prior snapshot with {} item(s); {} candidate(s) this cycle",
            prior.len(),
            candidates.len()
        );

        let mut current = candidates;
        carry_forward_flags(&mut current, &prior);
        apply_closing_resets(&mut current, &self.config);

        let report = self.scheduler.enrich(&mut current).await;
        let notifications = compute_notifications(&current, &prior, &report);

        if let Err(source) = self.store.save(&current).await {
            error!("Failed to save snapshot: {}", source);
            return Err(CycleError::Persist {
                notifications: Box::new(notifications),
                source,
            });
        }

        info!(
            "Cycle complete: {} new, {} registration opened, {} closing soon, {} filling up",
            notifications.new.len(),
            notifications.registration_opened.len(),
            notifications.closing_soon.len(),
            notifications.filling_up.len()
        );
        Ok(notifications)
    }

    async fn watch_once(
        &self,
        lister: &dyn Lister,
        notifier: &dyn Notifier,
        policy: PersistFailurePolicy,
    ) -> Result<WatchReport> {
        let candidates = lister.fetch_listing().await?;
        let candidate_count = candidates.len();
        info!("Fetched {} candidate(s) from listing", candidate_count);

        match self.run_cycle(candidates).await {
            Ok(notifications) => {
                let dispatch = dispatch(notifier, &notifications).await;
                Ok(WatchReport {
                    candidates: candidate_count,
                    notifications,
                    dispatch,
                })
            }
            Err(e @ CycleError::Persist { .. }) => {
                match policy {
                    PersistFailurePolicy::SendAnyway => {
                        warn!("Snapshot not saved; sending notifications anyway, they may repeat next cycle");
                        if let Some(notifications) = e.notifications() {
                            dispatch(notifier, notifications).await;
                        }
                    }
                    PersistFailurePolicy::Suppress => {
                        let suppressed = e.notifications().map(Notifications::total).unwrap_or(0);
                        warn!(
                            "Snapshot not saved; suppressing {} notification(s) until a cycle persists",
                            suppressed
                        );
                    }
                }
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
