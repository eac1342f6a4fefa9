//! Decides, per item, whether a detail fetch is worth making and why.

use chrono::NaiveDateTime;
use log::warn;

use crate::config::WatchConfig;
use crate::items::{fill_percentage, Item};
use crate::utils::whole_days_until;

/// Which checks a detail fetch would serve for an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eligibility {
    /// The item is dated within the closing window and not yet notified.
    pub needs_closing_check: bool,
    /// The item looks at least half full and has not been reported as filling.
    pub needs_filling_check: bool,
}

impl Eligibility {
    pub fn any(&self) -> bool {
        self.needs_closing_check || self.needs_filling_check
    }
}

/// Evaluates both checks for `item` at `now`. Pure apart from logging.
pub fn evaluate(item: &Item, now: NaiveDateTime, config: &WatchConfig) -> Eligibility {
    Eligibility {
        needs_closing_check: needs_closing_check(item, now, config),
        needs_filling_check: needs_filling_check(item, config),
    }
}

/// Returns the checks to run when `item` should be enriched this cycle.
///
/// An item qualifies when it has a detail page, its registration is open,
/// and at least one check applies. Everything else passes through untouched.
pub fn eligibility_for(item: &Item, now: NaiveDateTime, config: &WatchConfig) -> Option<Eligibility> {
    if !item.has_detail_page() || !item.registration_open {
        return None;
    }
    let eligibility = evaluate(item, now, config);
    eligibility.any().then_some(eligibility)
}

fn needs_closing_check(item: &Item, now: NaiveDateTime, config: &WatchConfig) -> bool {
    if item.closing_notified || !item.has_known_date() {
        return false;
    }
    match item.parse_date() {
        Ok(date) => whole_days_until(date, now) <= config.closing_window_days,
        Err(e) => {
            warn!("Date parsing error for {}: {} ({:?})", item.name, e, item.date);
            false
        }
    }
}

fn needs_filling_check(item: &Item, config: &WatchConfig) -> bool {
    if item.filling_notified {
        return false;
    }
    let capacity = item.capacity_or(config.default_capacity);
    fill_percentage(item.registrants, capacity) >= config.filling_check_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn dated_in(days: i64) -> Item {
        let date = (midnight() + Duration::days(days)).date();
        Item {
            url: "https://example.com/t/1".to_string(),
            registration_open: true,
            ..Item::new("Club Classic", date.format("%m/%d/%Y").to_string(), "Hilltop")
        }
    }

    #[test]
    fn test_closing_window_boundary() {
        let config = WatchConfig::default();
        assert!(evaluate(&dated_in(14), midnight(), &config).needs_closing_check);
        assert!(!evaluate(&dated_in(15), midnight(), &config).needs_closing_check);
        assert!(evaluate(&dated_in(0), midnight(), &config).needs_closing_check);
    }

    #[test]
    fn test_partial_day_rounds_down() {
        // 14 days and 15 hours out counts as 14 whole days.
        let config = WatchConfig::default();
        let now = midnight() - Duration::hours(15);
        assert!(evaluate(&dated_in(14), now, &config).needs_closing_check);
    }

    #[test]
    fn test_closing_notified_suppresses_check() {
        let config = WatchConfig::default();
        let item = Item {
            closing_notified: true,
            ..dated_in(3)
        };
        assert!(!evaluate(&item, midnight(), &config).needs_closing_check);
    }

    #[test]
    fn test_unknown_or_malformed_date_is_excluded() {
        let config = WatchConfig::default();
        let item = Item {
            date: "N/A".to_string(),
            ..dated_in(3)
        };
        assert!(!evaluate(&item, midnight(), &config).needs_closing_check);

        let item = Item {
            date: "March 4 Wednesday".to_string(),
            ..dated_in(3)
        };
        assert!(!evaluate(&item, midnight(), &config).needs_closing_check);
    }

    #[test]
    fn test_filling_check_uses_default_capacity() {
        let config = WatchConfig::default();
        // 36 of the assumed 72 is exactly half.
        let item = Item {
            registrants: 36,
            ..dated_in(40)
        };
        assert!(evaluate(&item, midnight(), &config).needs_filling_check);

        let item = Item {
            registrants: 35,
            ..dated_in(40)
        };
        assert!(!evaluate(&item, midnight(), &config).needs_filling_check);
    }

    #[test]
    fn test_filling_check_uses_known_capacity() {
        let config = WatchConfig::default();
        let item = Item {
            registrants: 40,
            capacity: 50,
            ..dated_in(40)
        };
        assert!(evaluate(&item, midnight(), &config).needs_filling_check);

        let item = Item {
            registrants: 40,
            capacity: 200,
            ..dated_in(40)
        };
        assert!(!evaluate(&item, midnight(), &config).needs_filling_check);
    }

    #[test]
    fn test_eligibility_requires_detail_page_and_open_registration() {
        let config = WatchConfig::default();
        let item = dated_in(3);
        assert!(eligibility_for(&item, midnight(), &config).is_some());

        let closed = Item {
            registration_open: false,
            ..dated_in(3)
        };
        assert!(eligibility_for(&closed, midnight(), &config).is_none());

        let no_page = Item {
            url: "N/A".to_string(),
            ..dated_in(3)
        };
        assert!(eligibility_for(&no_page, midnight(), &config).is_none());

        let far_and_empty = dated_in(60);
        assert!(eligibility_for(&far_and_empty, midnight(), &config).is_none());
    }

    proptest! {
        #[test]
        fn notified_flags_always_suppress_checks(
            registrants in 0u32..500,
            capacity in 0u32..500,
            days in -30i64..60,
        ) {
            let config = WatchConfig::default();
            let item = Item {
                registrants,
                capacity,
                closing_notified: true,
                filling_notified: true,
                ..dated_in(days)
            };
            let eligibility = evaluate(&item, midnight(), &config);
            prop_assert!(!eligibility.any());
            prop_assert!(eligibility_for(&item, midnight(), &config).is_none());
        }
    }
}
