//! Listing page parsing and the HTTP lister.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use reqwest::Client;
use scraper::{ElementRef, Html};

use listwatch_core::constants::{LISTING_DATE_FORMAT, NOT_AVAILABLE};
use listwatch_core::errors::ListingError;
use listwatch_core::listing::Lister;
use listwatch_core::utils::Clock;
use listwatch_core::Item;

use crate::client;
use crate::html::{has_class, select_all, select_first, text_of};

const ENTRY_SELECTOR: &str = ".tournament-U, .tournament-C";
const OPEN_CLASS: &str = "trego";

/// Outcome of reading a listing date like `March 14 Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingDate {
    Upcoming(NaiveDate),
    Past,
    Unknown,
}

/// Parses every entry block of a listing page into an [`Item`].
///
/// Listing dates carry no year: a month earlier than `today`'s month rolls
/// over to next year. Entries dated before `today` are dropped; an entry
/// dated `today` is kept for the whole day, not only until midnight has
/// passed. Capacity is never on the listing, so every item starts with
/// capacity 0.
pub fn parse_listing(html: &str, base_url: &str, today: NaiveDate) -> Vec<Item> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for block in select_all(document.root_element(), ENTRY_SELECTOR) {
        let date = match select_first(block, ".t-date").map(text_of) {
            Some(text) => match infer_date(&text, today) {
                ListingDate::Upcoming(date) => date.format(LISTING_DATE_FORMAT).to_string(),
                ListingDate::Past => continue,
                ListingDate::Unknown => NOT_AVAILABLE.to_string(),
            },
            None => NOT_AVAILABLE.to_string(),
        };
        items.push(parse_entry(block, base_url, date));
    }

    items
}

fn parse_entry(block: ElementRef<'_>, base_url: &str, date: String) -> Item {
    let url = select_first(block, "a")
        .and_then(|link| link.value().attr("href"))
        .map(|href| format!("{}{}", base_url.trim_end_matches('/'), href))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let title = select_first(block, "em");
    let name = title
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let registration_open = title.map(|em| has_class(em, OPEN_CLASS)).unwrap_or(false);

    let spans = select_all(block, "span");
    let registrants_at = spans
        .iter()
        .position(|span| text_of(*span).contains("Registrants:"));
    let registrants = registrants_at
        .and_then(|index| {
            let text = text_of(spans[index]);
            text.split_once(':')
                .and_then(|(_, count)| count.trim().parse::<u32>().ok())
        })
        .unwrap_or(0);

    let location_span = match registrants_at {
        Some(index) => spans.get(index + 1).copied(),
        None => spans
            .iter()
            .find(|span| text_of(**span).contains("at"))
            .copied(),
    };
    let location = location_span
        .map(text_of)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let tier = select_first(block, ".info.ts")
        .map(text_of)
        .filter(|tier| !tier.is_empty());

    Item {
        url,
        registration_open,
        registrants,
        tier,
        ..Item::new(name, date, location)
    }
}

fn infer_date(text: &str, today: NaiveDate) -> ListingDate {
    let mut words = text.split_whitespace();
    let (Some(month), Some(day)) = (words.next(), words.next()) else {
        return ListingDate::Unknown;
    };

    // A leap year accepts every month/day pair, including February 29.
    let Ok(probe) = NaiveDate::parse_from_str(&format!("{} {} 2000", month, day), "%B %d %Y")
    else {
        return ListingDate::Unknown;
    };

    let year = if probe.month() < today.month() {
        today.year() + 1
    } else {
        today.year()
    };
    match NaiveDate::from_ymd_opt(year, probe.month(), probe.day()) {
        Some(date) if date < today => ListingDate::Past,
        Some(date) => ListingDate::Upcoming(date),
        None => ListingDate::Unknown,
    }
}

// ============================================================================
// HtmlLister
// ============================================================================

/// Fetches and parses the listing page over HTTP.
pub struct HtmlLister {
    client: Client,
    listing_url: String,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl HtmlLister {
    pub fn new(
        listing_url: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ListingError> {
        let client = client::build_client(timeout)
            .map_err(|e| ListingError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            listing_url: listing_url.into(),
            base_url: base_url.into(),
            clock,
        })
    }
}

#[async_trait]
impl Lister for HtmlLister {
    async fn fetch_listing(&self) -> Result<Vec<Item>, ListingError> {
        debug!("Fetching listing page {}", self.listing_url);

        let response = client::get(&self.client, &self.listing_url)
            .send()
            .await
            .map_err(|e| ListingError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ListingError::Http(format!("Failed to read response: {}", e)))?;

        let items = parse_listing(&body, &self.base_url, self.clock.now().date());
        info!("Parsed {} item(s) from listing", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.com";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn block(class: &str, em_class: &str, name: &str, date: &str, extra: &str) -> String {
        format!(
            r#"<div class="{class}">
                 <a href="/tournaments/{slug}"><em class="{em_class}">{name}</em></a>
                 <div class="t-date">{date}</div>
                 {extra}
               </div>"#,
            slug = name.to_lowercase().replace(' ', "-"),
        )
    }

    #[test]
    fn test_parses_entry_fields() {
        let html = block(
            "tournament-U",
            "trego",
            "Spring Open",
            "April 12 Sunday",
            r#"<span>Registrants: 23</span><span>Riverside Park, NJ</span><div class="info ts">B-tier</div>"#,
        );
        let items = parse_listing(&html, BASE, today());

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name, "Spring Open");
        assert_eq!(item.url, "https://www.example.com/tournaments/spring-open");
        assert!(item.registration_open);
        assert_eq!(item.registrants, 23);
        assert_eq!(item.capacity, 0);
        assert_eq!(item.location, "Riverside Park, NJ");
        assert_eq!(item.date, "04/12/2026");
        assert_eq!(item.tier.as_deref(), Some("B-tier"));
        assert!(!item.closing_notified && !item.filling_notified);
    }

    #[test]
    fn test_closed_registration_and_missing_counts() {
        let html = block(
            "tournament-C",
            "",
            "Club Classic",
            "March 20 Friday",
            r#"<span>Registrants: soon</span><span>Hilltop</span>"#,
        );
        let items = parse_listing(&html, BASE, today());
        assert!(!items[0].registration_open);
        assert_eq!(items[0].registrants, 0);
        assert!(items[0].tier.is_none());
    }

    #[test]
    fn test_location_without_registrants() {
        let html = block(
            "tournament-U",
            "",
            "Ice Bowl",
            "March 21 Saturday",
            r#"<span>Held at Lakeside Course</span>"#,
        );
        let items = parse_listing(&html, BASE, today());
        assert_eq!(items[0].location, "Held at Lakeside Course");
    }

    #[test]
    fn test_year_rolls_over_and_past_entries_are_skipped() {
        let html = [
            block("tournament-U", "", "Winter Classic", "January 18 Sunday", ""),
            block("tournament-U", "", "Last Week Cup", "March 3 Tuesday", ""),
            block("tournament-U", "", "Today Open", "March 10 Tuesday", ""),
        ]
        .join("\n");
        let items = parse_listing(&html, BASE, today());

        let dates: Vec<_> = items.iter().map(|i| (i.name.as_str(), i.date.as_str())).collect();
        assert_eq!(
            dates,
            vec![("Winter Classic", "01/18/2027"), ("Today Open", "03/10/2026")]
        );
    }

    #[test]
    fn test_entry_dated_today_is_kept() {
        let html = [
            block("tournament-U", "", "Yesterday Doubles", "March 9 Monday", ""),
            block("tournament-U", "", "Today Open", "March 10 Tuesday", ""),
        ]
        .join("\n");
        let items = parse_listing(&html, BASE, today());

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Today Open");
        assert_eq!(items[0].date, "03/10/2026");
    }

    #[test]
    fn test_unparseable_date_is_unknown() {
        let html = block("tournament-U", "", "Mystery Meet", "TBD", "");
        let items = parse_listing(&html, BASE, today());
        assert_eq!(items[0].date, "N/A");
    }

    #[test]
    fn test_entry_without_link_or_title() {
        let html = r#"<div class="tournament-C"><span>Registrants: 4</span><span>Hilltop</span></div>"#;
        let items = parse_listing(html, BASE, today());
        assert_eq!(items[0].url, "N/A");
        assert_eq!(items[0].name, "N/A");
        assert_eq!(items[0].date, "N/A");
        assert_eq!(items[0].registrants, 4);
    }

    #[test]
    fn test_other_blocks_are_ignored() {
        let html = block("sidebar", "", "Ad Slot", "April 1 Wednesday", "");
        assert!(parse_listing(&html, BASE, today()).is_empty());
    }
}
