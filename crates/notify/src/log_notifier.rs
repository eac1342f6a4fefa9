//! Notifier that only writes events to the log.

use async_trait::async_trait;
use log::info;

use listwatch_core::errors::NotifyError;
use listwatch_core::events::{NotificationEvent, Notifier};

/// Logs each event at info level. Used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let item = &event.item;
        info!(
            "[{}] {} ({}, {}) registrants={} open={} url={}",
            event.kind,
            item.name,
            item.date,
            item.location,
            item.registrants,
            item.registration_open,
            item.url
        );
        Ok(())
    }
}
