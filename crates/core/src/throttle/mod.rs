//! Throttling policies for detail page fetches.
//!
//! Two independent policies guard the fetch target:
//!
//! - [`ConcurrencyGate`] bounds how many fetches are in flight.
//! - [`RateLimiter`] spaces fetch starts by a minimum interval.
//!
//! [`Throttle`] composes them in the order the scheduler needs (gate first,
//! then limiter), while each stays tunable and testable on its own.

mod concurrency_gate;
mod rate_limiter;

pub use concurrency_gate::{ConcurrencyGate, GatePermit};
pub use rate_limiter::RateLimiter;

use std::sync::Arc;

use crate::config::WatchConfig;

/// Gate plus limiter, shared by every fetch of a watcher.
#[derive(Debug, Clone)]
pub struct Throttle {
    gate: ConcurrencyGate,
    limiter: Arc<RateLimiter>,
}

impl Throttle {
    pub fn new(gate: ConcurrencyGate, limiter: Arc<RateLimiter>) -> Self {
        Self { gate, limiter }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(
            ConcurrencyGate::new(config.max_concurrent),
            Arc::new(RateLimiter::new(config.requests_per_minute)),
        )
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Takes a gate slot, then waits for the limiter.
    ///
    /// The returned permit holds the slot; drop it when the fetch finishes.
    pub async fn admit(&self) -> GatePermit {
        let permit = self.gate.acquire().await;
        self.limiter.wait_if_needed().await;
        permit
    }
}
