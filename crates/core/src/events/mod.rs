//! Notification events module.
//!
//! Provides the per-cycle notification categories and the notifier trait
//! that channel adapters (Discord, log output) implement.

mod notification;
mod notifier;

pub use notification::*;
pub use notifier::*;
