//! Defaults and sentinels shared across the watch pipeline.

/// Sentinel stored in `url` and `date` when the listing carries no value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Closing text used when no detail fetch has succeeded yet.
pub const UNKNOWN_CLOSING_TEXT: &str = "unknown";

/// Date format used for listing dates (`03/14/2026`).
pub const LISTING_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default minimum spacing between detail fetches: 10 per minute (6s apart).
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Default number of detail fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Default number of eligible items dispatched together.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default pause before every batch after the first.
pub const DEFAULT_INTER_BATCH_DELAY_SECONDS: f64 = 2.0;

/// Capacity assumed when neither the listing nor the detail page reports one.
pub const DEFAULT_CAPACITY: u32 = 72;

/// Fill percentage at which an item is reported as filling up.
pub const DEFAULT_FILLING_THRESHOLD_PERCENT: f64 = 75.0;

/// Estimated fill percentage at which a detail fetch is worth making.
pub const DEFAULT_FILLING_CHECK_PERCENT: f64 = 50.0;

/// Items dated within this many days are checked for closing registration.
pub const DEFAULT_CLOSING_WINDOW_DAYS: i64 = 14;

/// Registration closing in fewer than this many days is reported.
pub const DEFAULT_CLOSING_IMMINENT_DAYS: i64 = 7;
