//! Listwatch Core - enrichment and diff engine for scraped listings.
//!
//! This crate holds the cycle logic: eligibility filtering, throttled detail
//! enrichment, identity-keyed diffing and one-shot notification bookkeeping.
//! It is transport-agnostic and defines the traits that the `scrape`,
//! `storage` and `notify` crates implement.

pub mod config;
pub mod constants;
pub mod cycle;
pub mod diff;
pub mod enrichment;
pub mod errors;
pub mod events;
pub mod items;
pub mod listing;
pub mod snapshot;
pub mod throttle;
pub mod utils;

pub use config::WatchConfig;
pub use cycle::{CycleService, CycleServiceTrait, PersistFailurePolicy, WatchReport};
pub use items::{DetailResult, Identity, Item};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
