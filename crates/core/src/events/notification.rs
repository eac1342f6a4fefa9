//! Notification categories produced by a watch cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::items::Item;

/// The four things a cycle can report about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Identity not present in the prior snapshot.
    New,
    /// Registration was closed in the prior snapshot and is open now.
    RegistrationOpened,
    /// Registration closes within the imminent window.
    ClosingSoon,
    /// Registrants crossed the filling threshold.
    FillingUp,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::New,
        NotificationKind::RegistrationOpened,
        NotificationKind::ClosingSoon,
        NotificationKind::FillingUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::New => "new",
            NotificationKind::RegistrationOpened => "registration_opened",
            NotificationKind::ClosingSoon => "closing_soon",
            NotificationKind::FillingUp => "filling_up",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single item to announce under a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub item: Item,
}

/// Output of one cycle: items per category, each in current-list order.
///
/// An item may appear in several categories in the same cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notifications {
    pub new: Vec<Item>,
    pub registration_opened: Vec<Item>,
    pub closing_soon: Vec<Item>,
    pub filling_up: Vec<Item>,
}

impl Notifications {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.new.len()
            + self.registration_opened.len()
            + self.closing_soon.len()
            + self.filling_up.len()
    }

    pub fn items(&self, kind: NotificationKind) -> &[Item] {
        match kind {
            NotificationKind::New => &self.new,
            NotificationKind::RegistrationOpened => &self.registration_opened,
            NotificationKind::ClosingSoon => &self.closing_soon,
            NotificationKind::FillingUp => &self.filling_up,
        }
    }

    /// Flattens the categories into send order: new, opened, closing, filling.
    pub fn events(&self) -> Vec<NotificationEvent> {
        NotificationKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.items(kind).iter().map(move |item| NotificationEvent {
                    kind,
                    item: item.clone(),
                })
            })
            .collect()
    }
}
