//! Tunables for the enrichment and diff pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::*;
use crate::errors::{Error, Result};

/// Configuration recognized by the watch pipeline.
///
/// The two throttles are independent: `max_concurrent` bounds fetches in
/// flight, `requests_per_minute` spaces fetch starts. Setting
/// `requests_per_minute` to 0 disables spacing without touching the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub requests_per_minute: u32,
    pub max_concurrent: usize,
    pub batch_size: usize,
    pub inter_batch_delay_seconds: f64,
    pub default_capacity: u32,
    pub filling_threshold_percent: f64,
    /// Estimated fill percentage at which an item becomes eligible for a fetch.
    pub filling_check_percent: f64,
    pub closing_window_days: i64,
    pub closing_imminent_days: i64,
    /// Item names whose `closing_notified` flag is cleared at the start of
    /// every cycle, re-arming the closing-soon notification for them.
    pub closing_reset_names: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_seconds: DEFAULT_INTER_BATCH_DELAY_SECONDS,
            default_capacity: DEFAULT_CAPACITY,
            filling_threshold_percent: DEFAULT_FILLING_THRESHOLD_PERCENT,
            filling_check_percent: DEFAULT_FILLING_CHECK_PERCENT,
            closing_window_days: DEFAULT_CLOSING_WINDOW_DAYS,
            closing_imminent_days: DEFAULT_CLOSING_IMMINENT_DAYS,
            closing_reset_names: Vec::new(),
        }
    }
}

impl WatchConfig {
    /// Checks that every value can drive the pipeline without stalling it.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.default_capacity == 0 {
            return Err(Error::InvalidConfig(
                "default_capacity must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("inter_batch_delay_seconds", self.inter_batch_delay_seconds),
            ("filling_threshold_percent", self.filling_threshold_percent),
            ("filling_check_percent", self.filling_check_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if Duration::try_from_secs_f64(self.inter_batch_delay_seconds).is_err() {
            return Err(Error::InvalidConfig(format!(
                "inter_batch_delay_seconds is out of range, got {}",
                self.inter_batch_delay_seconds
            )));
        }
        Ok(())
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.inter_batch_delay_seconds.max(0.0))
            .unwrap_or(Duration::MAX)
    }

    /// Whether the named item has its closing flag re-armed every cycle.
    pub fn resets_closing_for(&self, name: &str) -> bool {
        self.closing_reset_names.iter().any(|n| n == name)
    }
}
