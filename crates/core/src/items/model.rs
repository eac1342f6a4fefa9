//! Domain models for listing items and detail fetch results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{LISTING_DATE_FORMAT, NOT_AVAILABLE, UNKNOWN_CLOSING_TEXT};

/// Composite key used to match an item across cycles.
///
/// This is not a durable ID: two distinct real-world entries sharing name,
/// date and location collide. The key is kept for compatibility with the
/// listing source, which exposes nothing more stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    pub name: String,
    pub date: String,
    pub location: String,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.date, self.location)
    }
}

/// One listing entry, as observed in a cycle and persisted in the snapshot.
///
/// Field names on the wire match the historical `tournaments.json` layout so
/// existing snapshots keep loading; the notified flags also accept their
/// descriptive names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// Detail page address, or [`NOT_AVAILABLE`].
    pub url: String,
    #[serde(default)]
    pub registration_open: bool,
    pub location: String,
    /// Listing date as `MM/DD/YYYY`, or [`NOT_AVAILABLE`].
    pub date: String,
    /// Best-known registrant count.
    #[serde(default)]
    pub registrants: u32,
    /// Known capacity; 0 means unknown.
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub tier: Option<String>,
    /// Only populated after a successful detail fetch.
    #[serde(default)]
    pub closing_date: Option<NaiveDate>,
    #[serde(default = "default_closing_text")]
    pub closing_text: String,
    #[serde(
        default,
        rename = "registration_closing_sent",
        alias = "closing_notified"
    )]
    pub closing_notified: bool,
    #[serde(
        default,
        rename = "registration_filling_sent",
        alias = "filling_notified"
    )]
    pub filling_notified: bool,
}

fn default_closing_text() -> String {
    UNKNOWN_CLOSING_TEXT.to_string()
}

impl Item {
    /// Creates an item with no detail page, closed registration and no counts.
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: NOT_AVAILABLE.to_string(),
            registration_open: false,
            location: location.into(),
            date: date.into(),
            registrants: 0,
            capacity: 0,
            tier: None,
            closing_date: None,
            closing_text: default_closing_text(),
            closing_notified: false,
            filling_notified: false,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            name: self.name.clone(),
            date: self.date.clone(),
            location: self.location.clone(),
        }
    }

    /// Returns true when this item and `other` share the composite key.
    pub fn same_identity(&self, other: &Item) -> bool {
        self.name == other.name && self.date == other.date && self.location == other.location
    }

    pub fn has_detail_page(&self) -> bool {
        !self.url.is_empty() && self.url != NOT_AVAILABLE
    }

    pub fn has_known_date(&self) -> bool {
        !self.date.is_empty() && self.date != NOT_AVAILABLE
    }

    /// Parses the listing date. Callers check [`has_known_date`](Self::has_known_date) first.
    pub fn parse_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(self.date.trim(), LISTING_DATE_FORMAT)
    }

    /// Capacity to compute ratios against: the known capacity, or `fallback` when unknown.
    pub fn capacity_or(&self, fallback: u32) -> u32 {
        if self.capacity > 0 {
            self.capacity
        } else {
            fallback
        }
    }
}

/// Output of a detail page fetch.
///
/// A failed or malformed fetch is represented by the neutral value
/// ([`DetailResult::neutral`]), so the scheduler always has something to merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailResult {
    /// Human-readable closing description, when the page carries one.
    pub closing_text: Option<String>,
    pub closing_date: Option<NaiveDate>,
    pub registrants: u32,
    /// 0 when the page does not report a capacity.
    pub capacity: u32,
}

impl DetailResult {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Computes `registrants / capacity` as a percentage; 0 when capacity is 0.
pub fn fill_percentage(registrants: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (f64::from(registrants) / f64::from(capacity)) * 100.0
}
