use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "gh-notify.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub credential: CredentialConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub seen: SeenConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Used whenever the server gives no usable `X-Poll-Interval`.
    #[serde(default = "default_fallback_poll")]
    pub fallback_poll_interval_s: u64,
}

fn default_endpoint() -> String {
    "https://api.github.com/notifications".to_string()
}
fn default_api_version() -> String {
    "2022-11-28".to_string()
}
fn default_user_agent() -> String {
    concat!("gh-notify/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_request_timeout() -> u64 {
    30_000
}
fn default_fallback_poll() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout(),
            fallback_poll_interval_s: default_fallback_poll(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialConfig {
    /// Program and arguments whose trimmed stdout is the bearer token.
    #[serde(default = "default_credential_command")]
    pub command: Vec<String>,
}

fn default_credential_command() -> Vec<String> {
    vec!["gh".to_string(), "auth".to_string(), "token".to_string()]
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            command: default_credential_command(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_alert_command")]
    pub command: String,
    /// 0 keeps the popup until dismissed.
    #[serde(default)]
    pub expire_timeout_ms: u32,
}

fn default_app_name() -> String {
    "GitHub".to_string()
}
fn default_alert_command() -> String {
    "notify-send".to_string()
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            command: default_alert_command(),
            expire_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeenConfig {
    /// Cap on remembered notification ids. Unbounded when absent.
    pub max_entries: Option<usize>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.feed.fallback_poll_interval_s == 0 {
            anyhow::bail!("feed.fallback_poll_interval_s must be greater than zero");
        }
        if self.feed.endpoint.trim().is_empty() {
            anyhow::bail!("feed.endpoint cannot be empty");
        }
        if self.credential.command.is_empty() {
            anyhow::bail!("credential.command must name a program");
        }
        if self.alert.command.trim().is_empty() {
            anyhow::bail!("alert.command cannot be empty");
        }
        if self.seen.max_entries == Some(0) {
            anyhow::bail!("seen.max_entries must be at least 1 when set");
        }
        Ok(())
    }
}
