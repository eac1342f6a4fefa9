//! Core error types for the watch pipeline.
//!
//! This module defines backend-agnostic error types. Adapter crates (HTTP,
//! storage, notification channels) convert their library errors into these
//! types so the core never depends on reqwest, rusqlite or similar.

use thiserror::Error;

use crate::events::Notifications;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the watch pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Snapshot store failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Listing fetch failed: {0}")]
    Listing(#[from] ListingError),

    #[error("Notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("Watch cycle failed: {0}")]
    Cycle(#[from] CycleError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),
}

/// Errors raised while fetching or parsing a per-item detail page.
///
/// These never leave the enrichment scheduler: a failed fetch is logged and
/// replaced by a neutral [`DetailResult`](crate::items::DetailResult).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Could not parse detail page: {0}")]
    Parse(String),

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Errors raised by a [`SnapshotStore`](crate::snapshot::SnapshotStore).
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// Errors raised by a [`Lister`](crate::listing::Lister).
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Could not parse listing page: {0}")]
    Parse(String),
}

/// Errors raised by a [`Notifier`](crate::events::Notifier).
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Channel rejected the message with status {0}")]
    Rejected(u16),
}

/// Failure of a single watch cycle.
#[derive(Error, Debug)]
pub enum CycleError {
    /// The prior snapshot could not be read. Nothing was enriched or saved.
    #[error("Failed to load prior snapshot: {0}")]
    Load(#[source] SnapshotError),

    /// The cycle ran to completion but the new snapshot was not saved.
    ///
    /// The computed notifications are carried along; whether to send them is
    /// the caller's policy, since the notified flags did not stick.
    #[error("Failed to persist snapshot: {source}")]
    Persist {
        notifications: Box<Notifications>,
        #[source]
        source: SnapshotError,
    },
}

impl CycleError {
    /// Notifications computed before the failure, if any.
    pub fn notifications(&self) -> Option<&Notifications> {
        match self {
            CycleError::Load(_) => None,
            CycleError::Persist { notifications, .. } => Some(notifications),
        }
    }

    /// Consumes the error and returns the computed notifications, if any.
    pub fn into_notifications(self) -> Option<Notifications> {
        match self {
            CycleError::Load(_) => None,
            CycleError::Persist { notifications, .. } => Some(*notifications),
        }
    }
}
