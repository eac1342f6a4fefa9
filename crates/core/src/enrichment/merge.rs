//! Folds a detail fetch result into the item it was fetched for.

use chrono::NaiveDateTime;
use log::info;

use super::eligibility::Eligibility;
use crate::config::WatchConfig;
use crate::items::{fill_percentage, DetailResult, Item};
use crate::utils::whole_days_until;

/// Categories an item qualified for while merging its detail result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub closing_soon: bool,
    pub filling_up: bool,
}

/// Applies `result` to `item`, only for the checks `eligibility` asked for.
///
/// Closing text and date are refreshed whenever the result carries them, so
/// later cycles see the latest known values even when nothing fires. A fired
/// category sets the matching notified flag, which never goes back to false.
pub fn merge_detail(
    item: &mut Item,
    result: &DetailResult,
    eligibility: Eligibility,
    now: NaiveDateTime,
    config: &WatchConfig,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    if let Some(text) = &result.closing_text {
        item.closing_text = text.clone();
    }
    if let Some(date) = result.closing_date {
        item.closing_date = Some(date);
    }

    if eligibility.needs_closing_check {
        if let Some(closing_date) = result.closing_date {
            if whole_days_until(closing_date, now) < config.closing_imminent_days {
                item.closing_notified = true;
                outcome.closing_soon = true;
            }
        }
    }

    if eligibility.needs_filling_check {
        let capacity = if result.capacity > 0 {
            result.capacity
        } else {
            item.capacity_or(config.default_capacity)
        };
        let registrants = result.registrants.max(item.registrants);

        if capacity > 0 {
            let percentage = fill_percentage(registrants, capacity);
            if percentage >= config.filling_threshold_percent {
                item.registrants = registrants;
                item.capacity = capacity;
                item.filling_notified = true;
                outcome.filling_up = true;
                info!(
                    "Filling up: {} - {}/{} ({:.1}%)",
                    item.name, registrants, capacity, percentage
                );
            }
        }
    }

    outcome
}
