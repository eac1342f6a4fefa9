//! Detail page parsing and the HTTP detail fetcher.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use scraper::Html;

use listwatch_core::enrichment::DetailFetcher;
use listwatch_core::errors::FetchError;
use listwatch_core::DetailResult;

use crate::client::{self, DEFAULT_TIMEOUT};
use crate::html::{select_all, select_first, text_of};

const CLOSES_MARKER: &str = "closes ";
const ONLINE_CLOSES_PREFIX: &str = "Online registration closes ";
const CLOSED_TEXT: &str = "Registration closed";
const CLOSING_DATE_FORMAT: &str = "%B %d, %Y";

// ============================================================================
// Parsing
// ============================================================================

/// Extracts closing and registration details from a detail page.
///
/// Anything that cannot be found or parsed keeps its neutral value.
pub fn parse_detail(html: &str) -> DetailResult {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut result = DetailResult::neutral();

    if let Some(cutoff) = select_first(root, "div.cutoff span") {
        let (text, date) = parse_closing(&text_of(cutoff));
        result.closing_text = Some(text);
        result.closing_date = date;
    }

    let registered = select_all(root, "a")
        .into_iter()
        .find(|link| text_of(*link).contains("Registered Players"));
    if let Some(span) = registered.and_then(|link| select_first(link, "span")) {
        if let Some((registrants, capacity)) = parse_counts(&text_of(span), " / ") {
            result.registrants = registrants;
            result.capacity = capacity;
        }
    }

    if result.registrants == 0 && result.capacity == 0 {
        if let Some(span) = select_first(root, ".registration-section .registrants") {
            let text = text_of(span);
            if let Some((_, counts)) = text.split_once("Players:") {
                if let Some((registrants, capacity)) = parse_counts(counts.trim(), "/") {
                    result.registrants = registrants;
                    result.capacity = capacity;
                }
            }
        }
    }

    result
}

/// Splits a cutoff line into display text and, when present, the closing date.
///
/// `"Online registration closes January 23, 2025 at 6:00pm EST"` becomes
/// `("January 23, 2025 at 6:00pm EST", 2025-01-23)`.
fn parse_closing(text: &str) -> (String, Option<NaiveDate>) {
    if let Some((_, rest)) = text.split_once(CLOSES_MARKER) {
        let date_part = rest.split(" at").next().unwrap_or(rest).trim();
        return match NaiveDate::parse_from_str(date_part, CLOSING_DATE_FORMAT) {
            Ok(date) => {
                let display = text
                    .split_once(ONLINE_CLOSES_PREFIX)
                    .map(|(_, tail)| tail.to_string())
                    .unwrap_or_else(|| text.to_string());
                (display, Some(date))
            }
            Err(e) => {
                warn!("Failed to parse closing date from '{}': {}", text, e);
                (text.to_string(), None)
            }
        };
    }
    if text.to_lowercase().contains("closed") {
        return (CLOSED_TEXT.to_string(), None);
    }
    (text.to_string(), None)
}

/// Parses `"80 / 216"` style counts, or a bare registrant count.
fn parse_counts(text: &str, separator: &str) -> Option<(u32, u32)> {
    if let Some((left, right)) = text.split_once(separator) {
        match (left.trim().parse::<u32>(), right.trim().parse::<u32>()) {
            (Ok(registrants), Ok(capacity)) => Some((registrants, capacity)),
            _ => {
                warn!("Failed to parse registrants/capacity from '{}'", text);
                None
            }
        }
    } else if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        text.parse::<u32>().ok().map(|registrants| (registrants, 0))
    } else {
        None
    }
}

// ============================================================================
// HttpDetailFetcher
// ============================================================================

/// Fetches detail pages over HTTP.
///
/// Each request uses a random browser user agent, and a short random pause
/// follows every response to keep the access pattern polite.
pub struct HttpDetailFetcher {
    client: Client,
    jitter: Option<(Duration, Duration)>,
}

impl HttpDetailFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = client::build_client(timeout)
            .map_err(|e| FetchError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            jitter: Some((Duration::from_secs(1), Duration::from_secs(2))),
        })
    }

    /// Replaces the post-request pause; `None` disables it.
    pub fn with_jitter(mut self, jitter: Option<(Duration, Duration)>) -> Self {
        self.jitter = jitter;
        self
    }

    async fn pause(&self) {
        if let Some((min, max)) = self.jitter {
            tokio::time::sleep(client::jitter(min, max)).await;
        }
    }
}

impl Default for HttpDetailFetcher {
    fn default() -> Self {
        Self {
            client: client::build_client(DEFAULT_TIMEOUT).unwrap_or_else(|_| Client::new()),
            jitter: Some((Duration::from_secs(1), Duration::from_secs(2))),
        }
    }
}

#[async_trait]
impl DetailFetcher for HttpDetailFetcher {
    async fn fetch_detail(&self, url: &str) -> Result<DetailResult, FetchError> {
        debug!("Fetching detail page {}", url);

        let response = client::get(&self.client, url).send().await;
        self.pause().await;

        let response = response.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Got status code {} from {}", status.as_u16(), url);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))?;
        Ok(parse_detail(&body))
    }
}
