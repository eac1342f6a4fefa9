//! Discord webhook notification channel.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;

use listwatch_core::constants::UNKNOWN_CLOSING_TEXT;
use listwatch_core::errors::NotifyError;
use listwatch_core::events::{NotificationEvent, NotificationKind, Notifier};
use listwatch_core::items::{fill_percentage, Item};

/// Environment variable for the Discord webhook URL.
pub const ENV_DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

const COLOR_BLUE: u32 = 0x3498db;
const COLOR_GREEN: u32 = 0x2ecc71;
const COLOR_ORANGE: u32 = 0xe67e22;
const COLOR_RED: u32 = 0xe74c3c;

/// Posts one embed per event to a Discord webhook.
pub struct DiscordNotifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Create a Discord notifier for `webhook_url`.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            webhook_url: Some(webhook_url.into()),
            client,
        }
    }

    pub fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    fn format_payload(event: &NotificationEvent) -> DiscordPayload {
        let item = &event.item;
        let (title, color) = match event.kind {
            NotificationKind::New => ("🚨 New Local Tournament 🚨", COLOR_BLUE),
            NotificationKind::RegistrationOpened => ("📖 Registration Open 📖", COLOR_GREEN),
            NotificationKind::ClosingSoon => ("⏰ Registration Closing Soon ⏰", COLOR_ORANGE),
            NotificationKind::FillingUp => ("🔥 Tournament Filling Up 🔥", COLOR_RED),
        };

        let mut fields = Vec::new();
        if let Some(tier) = item.tier.as_ref().filter(|t| !t.is_empty()) {
            fields.push(DiscordField {
                name: "Tier".to_string(),
                value: tier.clone(),
                inline: false,
            });
        }

        DiscordPayload {
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description: Self::format_description(event.kind, item),
                color,
                fields,
            }],
        }
    }

    fn format_description(kind: NotificationKind, item: &Item) -> String {
        let heading = if item.has_detail_page() {
            format!("[{}]({})", item.name, item.url)
        } else {
            format!("**{}**", item.name)
        };

        let registrants = match kind {
            NotificationKind::FillingUp if item.capacity > 0 => format!(
                "{}/{} ({:.1}%)",
                item.registrants,
                item.capacity,
                fill_percentage(item.registrants, item.capacity)
            ),
            _ => item.registrants.to_string(),
        };

        let mut description = format!(
            "{}\n\n**Location:** {}\n**Date:** {}\n**Registrants:** {}\n**Registration Open:** {}",
            heading,
            item.location,
            item.date,
            registrants,
            if item.registration_open { "Yes" } else { "No" }
        );
        let closing_known =
            !item.closing_text.is_empty() && item.closing_text != UNKNOWN_CLOSING_TEXT;
        if kind == NotificationKind::ClosingSoon && closing_known {
            description.push_str(&format!("\n**Registration Closes:** {}", item.closing_text));
        }
        description
    }
}

fn retry_after_secs(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .map(|secs| secs.ceil().max(1.0) as u64)
        .unwrap_or(1)
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let webhook_url = self
            .webhook_url
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured(ENV_DISCORD_WEBHOOK_URL.to_string()))?;

        let payload = Self::format_payload(event);
        debug!("Sending {} notification for {} to Discord", event.kind, event.item.name);

        let response = self
            .client
            .post(webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after_secs(&response),
            });
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Discord webhook returned {}: {}", status, body);
        Err(NotifyError::Rejected(status.as_u16()))
    }
}

// =============================================================================
// Discord API types
// =============================================================================

#[derive(Debug, Serialize)]
struct DiscordPayload {
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<DiscordField>,
}

#[derive(Debug, Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item {
            url: "https://example.com/t/club-classic".to_string(),
            registration_open: true,
            registrants: 45,
            capacity: 50,
            tier: Some("C-tier".to_string()),
            closing_text: "March 14, 2026 at 11:59pm EDT".to_string(),
            ..Item::new("Club Classic", "03/20/2026", "Hilltop")
        }
    }

    fn event(kind: NotificationKind) -> NotificationEvent {
        NotificationEvent { kind, item: item() }
    }

    #[test]
    fn test_titles_and_colors() {
        let cases = [
            (NotificationKind::New, "🚨 New Local Tournament 🚨", COLOR_BLUE),
            (NotificationKind::RegistrationOpened, "📖 Registration Open 📖", COLOR_GREEN),
            (NotificationKind::ClosingSoon, "⏰ Registration Closing Soon ⏰", COLOR_ORANGE),
            (NotificationKind::FillingUp, "🔥 Tournament Filling Up 🔥", COLOR_RED),
        ];
        for (kind, title, color) in cases {
            let payload = DiscordNotifier::format_payload(&event(kind));
            assert_eq!(payload.embeds[0].title, title);
            assert_eq!(payload.embeds[0].color, color);
        }
    }

    #[test]
    fn test_new_description() {
        let payload = DiscordNotifier::format_payload(&event(NotificationKind::New));
        let embed = &payload.embeds[0];
        assert_eq!(
            embed.description,
            "[Club Classic](https://example.com/t/club-classic)\n\n\
             **Location:** Hilltop\n**Date:** 03/20/2026\n\
             **Registrants:** 45\n**Registration Open:** Yes"
        );
        assert_eq!(embed.fields[0].name, "Tier");
        assert_eq!(embed.fields[0].value, "C-tier");
    }

    #[test]
    fn test_filling_and_closing_details() {
        let filling = DiscordNotifier::format_payload(&event(NotificationKind::FillingUp));
        assert!(filling.embeds[0]
            .description
            .contains("**Registrants:** 45/50 (90.0%)"));

        let closing = DiscordNotifier::format_payload(&event(NotificationKind::ClosingSoon));
        assert!(closing.embeds[0]
            .description
            .contains("**Registration Closes:** March 14, 2026 at 11:59pm EDT"));
    }

    #[test]
    fn test_unknown_closing_text_is_omitted() {
        let mut closing = event(NotificationKind::ClosingSoon);
        closing.item.closing_text = Item::new("Club Classic", "03/20/2026", "Hilltop").closing_text;

        let payload = DiscordNotifier::format_payload(&closing);
        assert!(!payload.embeds[0].description.contains("Registration Closes"));
    }

    #[test]
    fn test_payload_json_shape() {
        let mut no_tier = event(NotificationKind::New);
        no_tier.item.tier = None;
        no_tier.item.url = "N/A".to_string();

        let json = serde_json::to_value(DiscordNotifier::format_payload(&no_tier)).unwrap();
        let embed = &json["embeds"][0];
        assert_eq!(embed["color"], 0x3498db);
        assert!(embed.get("fields").is_none());
        assert!(embed["description"]
            .as_str()
            .unwrap()
            .starts_with("**Club Classic**"));
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_reports_not_configured() {
        let notifier = DiscordNotifier {
            webhook_url: None,
            client: reqwest::Client::new(),
        };
        assert!(!notifier.enabled());
        let result = notifier.notify(&event(NotificationKind::New)).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured(_))));
    }
}
