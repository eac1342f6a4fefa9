//! Batched, throttled detail enrichment.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::task::JoinHandle;

use super::eligibility::{eligibility_for, Eligibility};
use super::fetcher::DetailFetcher;
use super::merge::merge_detail;
use crate::config::WatchConfig;
use crate::errors::FetchError;
use crate::items::{DetailResult, Item};
use crate::throttle::Throttle;
use crate::utils::Clock;

/// What an enrichment pass did, with indices into the enriched slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub eligible: usize,
    pub failed: usize,
    /// Items that qualified as closing soon, in list order.
    pub closing_soon: Vec<usize>,
    /// Items that qualified as filling up, in list order.
    pub filling_up: Vec<usize>,
}

type PendingFetch = (usize, Eligibility, JoinHandle<Result<DetailResult, FetchError>>);

/// Fetches detail pages for eligible items and merges the results back.
///
/// Eligible items are split into batches of `batch_size`, in list order.
/// Every fetch in a batch is dispatched at once, then the scheduler sleeps
/// for the inter-batch delay before dispatching the next batch. Fetches of
/// an earlier batch may still be running when the next one is dispatched;
/// the shared [`Throttle`] is what bounds load on the target.
pub struct EnrichmentScheduler {
    fetcher: Arc<dyn DetailFetcher>,
    throttle: Throttle,
    config: WatchConfig,
    clock: Arc<dyn Clock>,
}

impl EnrichmentScheduler {
    pub fn new(
        fetcher: Arc<dyn DetailFetcher>,
        throttle: Throttle,
        config: WatchConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            throttle,
            config,
            clock,
        }
    }

    /// Enriches `items` in place and reports which ones fired a category.
    ///
    /// A fetch that fails or panics is logged and merged as a neutral result;
    /// it never aborts the pass or affects other items.
    pub async fn enrich(&self, items: &mut [Item]) -> EnrichmentReport {
        let now = self.clock.now();
        let eligible: Vec<(usize, Eligibility)> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                eligibility_for(item, now, &self.config).map(|eligibility| (index, eligibility))
            })
            .collect();

        let mut report = EnrichmentReport {
            eligible: eligible.len(),
            ..EnrichmentReport::default()
        };
        if eligible.is_empty() {
            debug!("No items need a detail fetch this cycle");
            return report;
        }

        let batch_size = self.config.batch_size.max(1);
        let batch_count = eligible.len().div_ceil(batch_size);
        let mut pending: Vec<PendingFetch> = Vec::with_capacity(eligible.len());

        for (batch_index, batch) in eligible.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(self.config.inter_batch_delay()).await;
            }
            debug!(
                "Dispatching batch {}/{} ({} item(s))",
                batch_index + 1,
                batch_count,
                batch.len()
            );
            for &(index, eligibility) in batch {
                let handle = self.spawn_fetch(items[index].url.clone());
                pending.push((index, eligibility, handle));
            }
        }

        for (index, eligibility, handle) in pending {
            let item = &mut items[index];
            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    error!("Error fetching details for {}: {}", item.name, e);
                    report.failed += 1;
                    DetailResult::neutral()
                }
                Err(e) => {
                    error!("Detail fetch task for {} did not complete: {}", item.name, e);
                    report.failed += 1;
                    DetailResult::neutral()
                }
            };

            let outcome = merge_detail(item, &result, eligibility, self.clock.now(), &self.config);
            if outcome.closing_soon {
                report.closing_soon.push(index);
            }
            if outcome.filling_up {
                report.filling_up.push(index);
            }
        }

        info!(
            "Enrichment summary: {} eligible, {} closing soon, {} filling up, {} failed",
            report.eligible,
            report.closing_soon.len(),
            report.filling_up.len(),
            report.failed
        );
        report
    }

    fn spawn_fetch(&self, url: String) -> JoinHandle<Result<DetailResult, FetchError>> {
        let fetcher = Arc::clone(&self.fetcher);
        let throttle = self.throttle.clone();
        tokio::spawn(async move {
            let _permit = throttle.admit().await;
            fetcher.fetch_detail(&url).await
        })
    }
}
