//! Notifier trait, delivery loop and in-process implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{error, info, warn};

use super::{NotificationEvent, NotificationKind, Notifications};
use crate::errors::NotifyError;

/// Delivers notification events to an outside channel.
///
/// # Design Rules
///
/// - One call per event; the caller decides ordering
/// - A failed delivery is reported, never retried here
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in log lines.
    fn name(&self) -> &'static str;

    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

/// Counts from one [`dispatch`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends every event of `notifications` through `notifier`, in send order.
///
/// Failures are logged and counted; the remaining events are still sent.
pub async fn dispatch(notifier: &dyn Notifier, notifications: &Notifications) -> DispatchReport {
    let mut report = DispatchReport::default();

    for event in notifications.events() {
        match notifier.notify(&event).await {
            Ok(()) => report.sent += 1,
            Err(NotifyError::NotConfigured(reason)) => {
                warn!(
                    "{} not configured, skipping {} for {}: {}",
                    notifier.name(),
                    event.kind,
                    event.item.name,
                    reason
                );
                report.failed += 1;
            }
            Err(e) => {
                error!(
                    "Failed to send {} notification for {} via {}: {}",
                    event.kind,
                    event.item.name,
                    notifier.name(),
                    e
                );
                report.failed += 1;
            }
        }
    }

    if report.sent + report.failed > 0 {
        info!(
            "Dispatched {} notification(s) via {} ({} failed)",
            report.sent,
            notifier.name(),
            report.failed
        );
    }
    report
}

/// No-op notifier for tests or dry runs.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn notify(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Mock notifier for testing - collects delivered events.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
    fail_kinds: Arc<Mutex<Vec<NotificationKind>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes deliveries of `kind` fail with a rejected status.
    pub fn fail_on(&self, kind: NotificationKind) {
        self.fail_kinds.lock().unwrap().push(kind);
    }

    /// Returns all delivered events.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        if self.fail_kinds.lock().unwrap().contains(&event.kind) {
            return Err(NotifyError::Rejected(500));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
