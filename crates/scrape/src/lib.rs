//! Listwatch Scrape - HTML adapters for the listing and detail pages.
//!
//! Provides [`HtmlLister`] and [`HttpDetailFetcher`], the HTTP-backed
//! implementations of the core `Lister` and `DetailFetcher` traits, plus the
//! pure parsers they use.

mod client;
mod detail;
mod html;
mod listing;

pub use client::DEFAULT_TIMEOUT;
pub use detail::{parse_detail, HttpDetailFetcher};
pub use listing::{parse_listing, HtmlLister};
