//! Detail fetcher trait and adapters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::FetchError;
use crate::items::DetailResult;

/// Fetches and parses one detail page.
///
/// Implementations must be safe to call from several tasks at once; the
/// scheduler bounds how many calls overlap.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, url: &str) -> Result<DetailResult, FetchError>;
}

/// Runs a blocking fetch function on tokio's blocking pool.
pub struct BlockingDetailFetcher<F> {
    fetch: Arc<F>,
}

impl<F> BlockingDetailFetcher<F>
where
    F: Fn(&str) -> Result<DetailResult, FetchError> + Send + Sync + 'static,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch: Arc::new(fetch),
        }
    }
}

#[async_trait]
impl<F> DetailFetcher for BlockingDetailFetcher<F>
where
    F: Fn(&str) -> Result<DetailResult, FetchError> + Send + Sync + 'static,
{
    async fn fetch_detail(&self, url: &str) -> Result<DetailResult, FetchError> {
        let fetch = Arc::clone(&self.fetch);
        let url = url.to_string();
        tokio::task::spawn_blocking(move || fetch(&url))
            .await
            .map_err(|e| FetchError::Other(format!("blocking fetch task failed: {}", e)))?
    }
}

/// Canned outcome for one URL of a [`MockDetailFetcher`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Detail(DetailResult),
    Error(String),
    Panic,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<String, MockResponse>>,
    latency: Mutex<Duration>,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Mock fetcher for testing - returns canned results and records calls.
///
/// Unknown URLs resolve to a neutral result.
#[derive(Clone, Default)]
pub struct MockDetailFetcher {
    state: Arc<MockState>,
}

impl MockDetailFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: impl Into<String>, result: DetailResult) {
        self.set(url, MockResponse::Detail(result));
    }

    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) {
        self.set(url, MockResponse::Error(message.into()));
    }

    pub fn panic_on(&self, url: impl Into<String>) {
        self.set(url, MockResponse::Panic);
    }

    /// Simulated time each fetch takes.
    pub fn set_latency(&self, latency: Duration) {
        *self.state.latency.lock().unwrap() = latency;
    }

    /// URLs fetched so far, in start order.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Start instants of every fetch, in start order.
    pub fn call_starts(&self) -> Vec<Instant> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    fn set(&self, url: impl Into<String>, response: MockResponse) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(url.into(), response);
    }
}

#[async_trait]
impl DetailFetcher for MockDetailFetcher {
    async fn fetch_detail(&self, url: &str) -> Result<DetailResult, FetchError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *self.state.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.state.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Detail(result)) => Ok(result),
            Some(MockResponse::Error(message)) => Err(FetchError::Parse(message)),
            Some(MockResponse::Panic) => panic!("mock fetcher panicked for {}", url),
            None => Ok(DetailResult::neutral()),
        }
    }
}
