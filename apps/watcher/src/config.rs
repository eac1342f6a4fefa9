use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use listwatch_core::WatchConfig;
use listwatch_notify::ENV_DISCORD_WEBHOOK_URL;

const DEFAULT_LISTING_URL: &str =
    "https://www.discgolfscene.com/tournaments/options;distance=60;zip=08043;country=USA";
const DEFAULT_BASE_URL: &str = "https://www.discgolfscene.com";
const DEFAULT_INTERVAL_MINUTES: u64 = 15;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Json,
    Sqlite,
}

impl StoreKind {
    fn default_path(self) -> &'static str {
        match self {
            StoreKind::Json => "tournaments.json",
            StoreKind::Sqlite => "tournaments.db",
        }
    }
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreKind::Json),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(anyhow!("expected 'json' or 'sqlite', got '{}'", other)),
        }
    }
}

pub struct Config {
    pub listing_url: String,
    pub base_url: String,
    pub store: StoreKind,
    pub snapshot_path: PathBuf,
    pub interval: Duration,
    pub http_timeout: Duration,
    pub send_on_persist_failure: bool,
    pub discord_webhook_url: Option<String>,
    pub watch: WatchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset keys take defaults;
    /// a set but unparseable value is an error naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store: StoreKind = parse_or(&var, "LISTWATCH_STORE", StoreKind::Json)?;
        let snapshot_path = var("LISTWATCH_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(store.default_path()));

        let interval_minutes: u64 =
            parse_or(&var, "LISTWATCH_INTERVAL_MINUTES", DEFAULT_INTERVAL_MINUTES)?;
        if interval_minutes == 0 {
            bail!("LISTWATCH_INTERVAL_MINUTES must be at least 1");
        }
        let timeout_secs: u64 =
            parse_or(&var, "LISTWATCH_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        let defaults = WatchConfig::default();
        let watch = WatchConfig {
            requests_per_minute: parse_or(
                &var,
                "LISTWATCH_REQUESTS_PER_MINUTE",
                defaults.requests_per_minute,
            )?,
            max_concurrent: parse_or(&var, "LISTWATCH_MAX_CONCURRENT", defaults.max_concurrent)?,
            batch_size: parse_or(&var, "LISTWATCH_BATCH_SIZE", defaults.batch_size)?,
            inter_batch_delay_seconds: parse_or(
                &var,
                "LISTWATCH_INTER_BATCH_DELAY_SECONDS",
                defaults.inter_batch_delay_seconds,
            )?,
            default_capacity: parse_or(
                &var,
                "LISTWATCH_DEFAULT_CAPACITY",
                defaults.default_capacity,
            )?,
            filling_threshold_percent: parse_or(
                &var,
                "LISTWATCH_FILLING_THRESHOLD_PERCENT",
                defaults.filling_threshold_percent,
            )?,
            filling_check_percent: parse_or(
                &var,
                "LISTWATCH_FILLING_CHECK_PERCENT",
                defaults.filling_check_percent,
            )?,
            closing_window_days: parse_or(
                &var,
                "LISTWATCH_CLOSING_WINDOW_DAYS",
                defaults.closing_window_days,
            )?,
            closing_imminent_days: parse_or(
                &var,
                "LISTWATCH_CLOSING_IMMINENT_DAYS",
                defaults.closing_imminent_days,
            )?,
            closing_reset_names: var("LISTWATCH_CLOSING_RESET_NAMES")
                .map(|names| {
                    names
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };
        watch.validate().context("Invalid watch configuration")?;

        Ok(Self {
            listing_url: var("LISTWATCH_LISTING_URL")
                .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string()),
            base_url: var("LISTWATCH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            store,
            snapshot_path,
            interval: Duration::from_secs(interval_minutes * 60),
            http_timeout: Duration::from_secs(timeout_secs),
            send_on_persist_failure: parse_flag(&var, "LISTWATCH_SEND_ON_PERSIST_FAILURE")?,
            discord_webhook_url: var(ENV_DISCORD_WEBHOOK_URL),
            watch,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid {}='{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_flag<F>(var: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => bail!("Invalid {}='{}': expected true or false", key, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.store, StoreKind::Json);
        assert_eq!(config.snapshot_path, PathBuf::from("tournaments.json"));
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(!config.send_on_persist_failure);
        assert!(config.discord_webhook_url.is_none());
        assert_eq!(config.watch, WatchConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("LISTWATCH_STORE", "sqlite"),
            ("LISTWATCH_REQUESTS_PER_MINUTE", "0"),
            ("LISTWATCH_MAX_CONCURRENT", "4"),
            ("LISTWATCH_INTER_BATCH_DELAY_SECONDS", "0.5"),
            ("LISTWATCH_CLOSING_RESET_NAMES", "Ice Bowl, Frost Classic,"),
            ("LISTWATCH_SEND_ON_PERSIST_FAILURE", "yes"),
            ("DISCORD_WEBHOOK_URL", "https://discord.example/hook"),
        ])
        .unwrap();

        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.snapshot_path, PathBuf::from("tournaments.db"));
        assert_eq!(config.watch.requests_per_minute, 0);
        assert_eq!(config.watch.max_concurrent, 4);
        assert_eq!(config.watch.inter_batch_delay_seconds, 0.5);
        assert_eq!(
            config.watch.closing_reset_names,
            vec!["Ice Bowl".to_string(), "Frost Classic".to_string()]
        );
        assert!(config.send_on_persist_failure);
        assert!(config.discord_webhook_url.is_some());
    }

    #[test]
    fn test_bad_values_name_the_variable() {
        let err = config(&[("LISTWATCH_BATCH_SIZE", "five")]).err().unwrap();
        assert!(err.to_string().contains("LISTWATCH_BATCH_SIZE"));

        let err = config(&[("LISTWATCH_STORE", "redis")]).err().unwrap();
        assert!(err.to_string().contains("LISTWATCH_STORE"));

        assert!(config(&[("LISTWATCH_MAX_CONCURRENT", "0")]).is_err());
        assert!(config(&[("LISTWATCH_INTERVAL_MINUTES", "0")]).is_err());
        assert!(config(&[("LISTWATCH_INTER_BATCH_DELAY_SECONDS", "1e20")]).is_err());
        assert!(config(&[("LISTWATCH_SEND_ON_PERSIST_FAILURE", "maybe")]).is_err());
    }
}
