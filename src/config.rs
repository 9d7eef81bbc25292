use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

use crate::views::DEFAULT_CHART_WIDTH;

pub const CONFIG_PATH_ENV: &str = "GARDEN_CONSOLE_CONFIG";
pub const DEVICE_URL_ENV: &str = "GARDEN_DEVICE_URL";
pub const POLL_MS_ENV: &str = "GARDEN_POLL_MS";

const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_MESSAGE_CLEAR_MS: u64 = 3000;

/// Console settings. Every field has a default, so an empty JSON object (or no
/// file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub device_url: String,
    pub poll_interval_ms: u64,
    pub message_clear_ms: u64,
    /// `None` keeps the transport default (no timeout).
    pub request_timeout_ms: Option<u64>,
    pub chart_width: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            device_url: DEFAULT_DEVICE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            message_clear_ms: DEFAULT_MESSAGE_CLEAR_MS,
            request_timeout_ms: None,
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl ConsoleConfig {
    /// Defaults, then the JSON file named by `cli_path` or `GARDEN_CONSOLE_CONFIG`,
    /// then the `GARDEN_DEVICE_URL` / `GARDEN_POLL_MS` overrides.
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self> {
        let path = cli_path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        Self::load_with(path.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let config = Self::from_json(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                info!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        if let Some(url) = env(DEVICE_URL_ENV) {
            config.device_url = url;
        }
        if let Some(ms) = env(POLL_MS_ENV) {
            config.poll_interval_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", POLL_MS_ENV, ms))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }
        if self.request_timeout_ms == Some(0) {
            bail!("request_timeout_ms must be greater than 0 (omit it for no timeout)");
        }
        if self.chart_width == 0 {
            bail!("chart_width must be greater than 0");
        }
        let url = self.device_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("device_url must start with http:// or https://, got '{}'", url);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn message_clear_delay(&self) -> Duration {
        Duration::from_millis(self.message_clear_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
