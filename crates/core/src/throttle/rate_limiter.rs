//! Minimum-interval rate limiter for detail page fetches.
//!
//! Spaces permitted calls at least `60 / requests_per_minute` seconds apart,
//! measured between the starts of consecutive permitted calls. One limiter is
//! shared by every fetch of a watcher, across batches and across cycles.

use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Global minimum-spacing limiter.
///
/// The spacing check, the wait and the timestamp update all happen while the
/// lock is held, so two concurrent callers can never pass the check together.
/// Tokio's mutex queues waiters in FIFO order, which gives strict first-come
/// ordering among blocked callers.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    /// Start time of the last permitted call.
    last_permitted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `requests_per_minute` calls per minute.
    ///
    /// A rate of 0 disables spacing entirely.
    pub fn new(requests_per_minute: u32) -> Self {
        let min_interval = if requests_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / f64::from(requests_per_minute))
        };
        Self::with_interval(min_interval)
    }

    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permitted: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn is_enabled(&self) -> bool {
        !self.min_interval.is_zero()
    }

    /// Waits until the minimum interval has elapsed since the previous
    /// permitted call, then records the current time as the new one.
    pub async fn wait_if_needed(&self) {
        if !self.is_enabled() {
            return;
        }

        let mut last = self.last_permitted.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(
                    "Rate limiting: waiting {:.2}s to respect rate limit",
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Time a caller arriving now would have to wait, ignoring queued callers.
    pub async fn time_until_available(&self) -> Duration {
        let last = self.last_permitted.lock().await;
        match *last {
            Some(previous) => self.min_interval.saturating_sub(previous.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Forgets the previous call, so the next caller passes immediately.
    pub async fn reset(&self) {
        *self.last_permitted.lock().await = None;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_REQUESTS_PER_MINUTE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_interval_from_rate() {
        assert_eq!(RateLimiter::new(10).min_interval(), Duration::from_secs(6));
        assert_eq!(RateLimiter::new(60).min_interval(), Duration::from_secs(1));
        assert!(!RateLimiter::new(0).is_enabled());
        assert_eq!(RateLimiter::default().min_interval(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_passes_immediately() {
        let limiter = RateLimiter::new(10);
        let start = Instant::now();
        limiter.wait_if_needed().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_calls_are_spaced() {
        let limiter = RateLimiter::new(10);
        let mut starts = Vec::new();
        for _ in 0..4 {
            limiter.wait_if_needed().await;
            starts.push(Instant::now());
        }
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_spacing_counts_time_already_elapsed() {
        let limiter = RateLimiter::new(10);
        limiter.wait_if_needed().await;
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(limiter.time_until_available().await, Duration::from_secs(2));
        let start = Instant::now();
        limiter.wait_if_needed().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_share_a_slot() {
        let limiter = Arc::new(RateLimiter::new(10));
        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.wait_if_needed().await;
                Instant::now()
            }));
        }

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rate_never_waits() {
        let limiter = RateLimiter::new(0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait_if_needed().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset() {
        let limiter = RateLimiter::new(10);
        limiter.wait_if_needed().await;
        limiter.reset().await;

        let start = Instant::now();
        limiter.wait_if_needed().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
