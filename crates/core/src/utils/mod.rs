pub mod time_utils;

pub use time_utils::{whole_days_until, Clock, FixedClock, SystemClock};
