//! Listwatch Notify - notification channels.
//!
//! Implements the core `Notifier` trait for a Discord webhook and for plain
//! log output.

mod discord;
mod log_notifier;

pub use discord::{DiscordNotifier, ENV_DISCORD_WEBHOOK_URL};
pub use log_notifier::LogNotifier;
