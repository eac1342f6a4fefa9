//! Identity-keyed comparison of the current list against the prior snapshot.

use std::collections::HashMap;

use log::debug;

use crate::config::WatchConfig;
use crate::enrichment::EnrichmentReport;
use crate::events::Notifications;
use crate::items::{Identity, Item};

/// Indexes `prior` by identity. The first occurrence of a duplicated
/// identity is the match target.
fn index_by_identity(prior: &[Item]) -> HashMap<Identity, &Item> {
    let mut index = HashMap::with_capacity(prior.len());
    for item in prior {
        index.entry(item.identity()).or_insert(item);
    }
    index
}

/// Seeds each current item's notified flags from its prior match.
///
/// Flags only ever go from false to true here. Closing details learned in
/// earlier cycles are kept when the current item has none of its own.
pub fn carry_forward_flags(current: &mut [Item], prior: &[Item]) {
    let index = index_by_identity(prior);
    for item in current.iter_mut() {
        let Some(previous) = index.get(&item.identity()) else {
            continue;
        };
        item.closing_notified |= previous.closing_notified;
        item.filling_notified |= previous.filling_notified;
        if item.closing_date.is_none() {
            item.closing_date = previous.closing_date;
            if previous.closing_date.is_some() {
                item.closing_text = previous.closing_text.clone();
            }
        }
    }
}

/// Re-arms the closing notification for items named in
/// `closing_reset_names`. Runs right after [`carry_forward_flags`].
pub fn apply_closing_resets(current: &mut [Item], config: &WatchConfig) {
    if config.closing_reset_names.is_empty() {
        return;
    }
    for item in current.iter_mut() {
        if item.closing_notified && config.resets_closing_for(&item.name) {
            debug!("Re-arming closing notification for {}", item.name);
            item.closing_notified = false;
        }
    }
}

/// Builds the four notification lists for a cycle.
///
/// `new` and `registration_opened` come from comparing identities with
/// `prior`; `closing_soon` and `filling_up` come from the enrichment pass
/// over `current`. Every list keeps `current` order.
pub fn compute_notifications(
    current: &[Item],
    prior: &[Item],
    report: &EnrichmentReport,
) -> Notifications {
    let index = index_by_identity(prior);
    let mut notifications = Notifications::default();

    for item in current {
        match index.get(&item.identity()) {
            None => notifications.new.push(item.clone()),
            Some(previous) => {
                if !previous.registration_open && item.registration_open {
                    notifications.registration_opened.push(item.clone());
                }
            }
        }
    }

    notifications.closing_soon = pick(current, &report.closing_soon);
    notifications.filling_up = pick(current, &report.filling_up);
    notifications
}

fn pick(current: &[Item], indices: &[usize]) -> Vec<Item> {
    let mut indices = indices.to_vec();
    indices.sort_unstable();
    indices.dedup();
    indices
        .into_iter()
        .filter_map(|index| current.get(index).cloned())
        .collect()
}
