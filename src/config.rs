//! Configuration loading.
//!
//! Settings come from a TOML file whose sections all have defaults, so an
//! empty or missing file yields a working log-only setup. A few deployment
//! specific values can be overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};
use crate::parser::{RecordParser, DEFAULT_LOCATIONS};
use crate::scrapers::types::{ScrapeParams, DEFAULT_SELECTORS, DEFAULT_USER_AGENT};

pub const DEFAULT_CONFIG_PATH: &str = "flat-watch.toml";

pub const ENV_TARGET_URL: &str = "FLAT_WATCH_TARGET_URL";
pub const ENV_WEBHOOK_URL: &str = "FLAT_WATCH_WEBHOOK_URL";
pub const ENV_DATA_FILE: &str = "FLAT_WATCH_DATA_FILE";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub monitoring: MonitoringConfig,
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub notification: NotificationConfig,
    pub parser: ParserConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringConfig {
    pub target_url: String,
    pub check_interval_minutes: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            target_url: ScrapeParams::default().target_url,
            check_interval_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Browser,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub selectors: Vec<String>,
    pub min_text_len: usize,
    pub load_wait_secs: u64,
    pub content_timeout_secs: u64,
    pub headless: bool,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            min_text_len: 20,
            load_wait_secs: 3,
            content_timeout_secs: 30,
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub file_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("apartment_data.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Log,
    Webhook,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub kind: NotificationKind,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Zone names in match priority order
    pub locations: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist. Environment overrides are applied and the result validated.
    ///
    /// Runs before logging is set up, so it does not log.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_TARGET_URL) {
            self.monitoring.target_url = url;
        }
        if let Some(url) = lookup(ENV_WEBHOOK_URL) {
            self.notification.webhook_url = Some(url);
        }
        if let Some(path) = lookup(ENV_DATA_FILE) {
            self.storage.file_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.monitoring.target_url.trim().is_empty() {
            return Err(WatchError::config("monitoring.target_url must not be empty"));
        }
        if self.monitoring.check_interval_minutes == 0 {
            return Err(WatchError::config(
                "monitoring.check_interval_minutes must be at least 1",
            ));
        }
        if self.source.selectors.is_empty() {
            return Err(WatchError::config("source.selectors must not be empty"));
        }
        if self.notification.kind == NotificationKind::Webhook
            && self.notification.webhook_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(WatchError::config(format!(
                "notification.webhook_url (or {}) is required for webhook notifications",
                ENV_WEBHOOK_URL
            )));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring.check_interval_minutes * 60)
    }

    pub fn scrape_params(&self) -> ScrapeParams {
        ScrapeParams {
            target_url: self.monitoring.target_url.clone(),
            selectors: self.source.selectors.clone(),
            min_text_len: self.source.min_text_len,
            load_wait: Duration::from_secs(self.source.load_wait_secs),
            content_timeout: Duration::from_secs(self.source.content_timeout_secs),
            headless: self.source.headless,
            user_agent: self.source.user_agent.clone(),
        }
    }

    pub fn record_parser(&self) -> RecordParser {
        RecordParser::with_locations(self.parser.locations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [monitoring]
            check_interval_minutes = 5

            [source]
            kind = "http"
            selectors = ["tbody tr"]

            [notification]
            kind = "webhook"
            webhook_url = "https://hooks.example.com/flat"
            "#,
        )
        .unwrap();

        assert_eq!(config.check_interval(), Duration::from_secs(300));
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.min_text_len, 20);
        assert_eq!(config.scrape_params().selectors, vec!["tbody tr".to_string()]);
        assert_eq!(config.notification.kind, NotificationKind::Webhook);
        assert_eq!(config.storage.file_path, PathBuf::from("apartment_data.json"));
        config.validate().unwrap();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(matches!(
            Config::from_toml("[monitoring\n"),
            Err(WatchError::Toml(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join("absent.toml")).unwrap();

        assert_eq!(config.monitoring.check_interval_minutes, 30);
        assert_eq!(config.notification.kind, NotificationKind::Log);
    }

    #[test]
    fn test_overrides() {
        let env = HashMap::from([
            (ENV_TARGET_URL, "https://example.com/list"),
            (ENV_WEBHOOK_URL, "https://hooks.example.com/x"),
            (ENV_DATA_FILE, "/var/lib/flat-watch/data.json"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.monitoring.target_url, "https://example.com/list");
        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://hooks.example.com/x")
        );
        assert_eq!(
            config.storage.file_path,
            PathBuf::from("/var/lib/flat-watch/data.json")
        );
    }

    #[test]
    fn test_webhook_requires_url() {
        let mut config = Config::default();
        config.notification.kind = NotificationKind::Webhook;

        assert!(matches!(config.validate(), Err(WatchError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = Config::default();
        config.monitoring.check_interval_minutes = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parser_uses_configured_locations() {
        let config = Config::from_toml("[parser]\nlocations = [\"Hafenstraße\"]").unwrap();
        let record = config
            .record_parser()
            .parse("1/ 2 Single Hafenstraße 20.00 300.00");

        assert_eq!(record.location.as_deref(), Some("Hafenstrasse"));
    }
}
