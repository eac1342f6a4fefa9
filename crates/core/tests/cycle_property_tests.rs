//! Property-based integration tests for the watch cycle.
//!
//! Each case runs several cycles over random candidate lists and random
//! detail responses, then checks the properties that must hold regardless
//! of input.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use listwatch_core::{
    enrichment::MockDetailFetcher,
    snapshot::{MemorySnapshotStore, SnapshotStore},
    utils::FixedClock,
    CycleService, CycleServiceTrait, DetailResult, Identity, Item, WatchConfig,
};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Generates an item drawn from a small name pool so identities collide
/// across cycles often enough to matter.
fn arb_item() -> impl Strategy<Value = Item> {
    (
        prop::sample::select(vec!["Ice Bowl", "Club Classic", "Ridge Run", "Spring Open"]),
        1i64..40,                    // days until the event
        any::<bool>(),               // registration open
        0u32..120,                   // registrants
        prop::option::of(0u32..120), // capacity
    )
        .prop_map(|(name, days, open, registrants, capacity)| {
            let date = (now() + Duration::days(days)).format("%m/%d/%Y").to_string();
            Item {
                url: format!("https://example.com/t/{}", name.to_lowercase().replace(' ', "-")),
                registration_open: open,
                registrants,
                capacity: capacity.unwrap_or(0),
                ..Item::new(name, date, "Hilltop")
            }
        })
}

/// Generates a detail response, or `None` for a URL with no canned reply.
fn arb_detail() -> impl Strategy<Value = Option<DetailResult>> {
    prop::option::of((0i64..30, 0u32..120, 0u32..120).prop_map(|(days, registrants, capacity)| {
        let closing = (now() + Duration::days(days)).date();
        DetailResult {
            closing_text: Some(closing.format("%B %d, %Y").to_string()),
            closing_date: Some(closing),
            registrants,
            capacity,
        }
    }))
}

fn arb_cycle() -> impl Strategy<Value = (Vec<Item>, Vec<Option<DetailResult>>)> {
    (
        prop::collection::vec(arb_item(), 0..6),
        prop::collection::vec(arb_detail(), 4),
    )
}

fn flags_by_identity(items: &[Item]) -> HashMap<Identity, (bool, bool)> {
    let mut flags = HashMap::new();
    for item in items {
        flags
            .entry(item.identity())
            .or_insert((item.closing_notified, item.filling_notified));
    }
    flags
}

fn run_cycles(cycles: Vec<(Vec<Item>, Vec<Option<DetailResult>>)>) -> Vec<(Vec<Item>, usize)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    runtime.block_on(async move {
        let store = Arc::new(MemorySnapshotStore::new());
        let fetcher = MockDetailFetcher::new();
        let config = WatchConfig {
            requests_per_minute: 0,
            inter_batch_delay_seconds: 0.0,
            ..WatchConfig::default()
        };
        let service = CycleService::new(
            store.clone(),
            Arc::new(fetcher.clone()),
            config,
            Arc::new(FixedClock(now())),
        )
        .unwrap();

        let mut snapshots = Vec::new();
        for (candidates, details) in cycles {
            for (item, detail) in candidates.iter().zip(details) {
                if let Some(detail) = detail {
                    fetcher.respond(item.url.clone(), detail);
                }
            }
            let notifications = service.run_cycle(candidates).await.unwrap();
            snapshots.push((store.load().await.unwrap(), notifications.new.len()));
        }
        snapshots
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Notified flags never go from true back to false for an identity that
    /// stays on the listing.
    #[test]
    fn prop_flags_are_monotonic(cycles in prop::collection::vec(arb_cycle(), 1..5)) {
        let snapshots = run_cycles(cycles);
        for pair in snapshots.windows(2) {
            let before = flags_by_identity(&pair[0].0);
            let after = flags_by_identity(&pair[1].0);
            for (identity, (closing, filling)) in &after {
                if let Some((was_closing, was_filling)) = before.get(identity) {
                    prop_assert!(*closing || !*was_closing, "closing flag reset for {:?}", identity);
                    prop_assert!(*filling || !*was_filling, "filling flag reset for {:?}", identity);
                }
            }
        }
    }

    /// Repeating an unchanged, non-empty candidate list reports nothing new.
    #[test]
    fn prop_repeat_cycle_reports_no_new_items(
        (candidates, details) in arb_cycle().prop_filter("non-empty", |(c, _)| !c.is_empty())
    ) {
        let snapshots = run_cycles(vec![
            (candidates.clone(), details.clone()),
            (candidates.clone(), details),
        ]);
        let distinct: HashSet<Identity> = candidates.iter().map(Item::identity).collect();
        prop_assert!(snapshots[0].1 >= distinct.len());
        prop_assert_eq!(snapshots[1].1, 0);
    }
}
