use chrono::{Local, NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Source of the current local wall-clock time.
///
/// Injected into the eligibility filter and the enrichment scheduler so day
/// arithmetic is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Number of whole days from `now` until the start of `date`.
///
/// Floors towards negative infinity, so a date earlier today or in the past
/// yields a negative count, and "tomorrow at 00:00" seen from 10:00 today is 0.
pub fn whole_days_until(date: NaiveDate, now: NaiveDateTime) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    (midnight - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_whole_days_from_midnight() {
        assert_eq!(whole_days_until(day(2026, 3, 15), at(2026, 3, 1, 0)), 14);
        assert_eq!(whole_days_until(day(2026, 3, 1), at(2026, 3, 1, 0)), 0);
    }

    #[test]
    fn test_whole_days_floors_partial_days() {
        // 13 days and 14 hours away
        assert_eq!(whole_days_until(day(2026, 3, 15), at(2026, 3, 1, 10)), 13);
        assert_eq!(whole_days_until(day(2026, 3, 2), at(2026, 3, 1, 10)), 0);
    }

    #[test]
    fn test_whole_days_in_the_past_are_negative() {
        assert_eq!(whole_days_until(day(2026, 3, 1), at(2026, 3, 1, 10)), -1);
        assert_eq!(whole_days_until(day(2026, 2, 20), at(2026, 3, 1, 0)), -9);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(at(2026, 3, 1, 9));
        assert_eq!(clock.now(), at(2026, 3, 1, 9));
    }
}
