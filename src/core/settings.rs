use crate::core::error::ConfigError;
use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_STATUS_URL: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

/// One year. Upstream keeps statuses far shorter than this.
pub const MAX_LOOKBACK_SECS: u64 = 366 * 24 * 60 * 60;

const INTERVAL_OVERRIDE_VAR: &str = "HOMEWORK_POLL_INTERVAL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub polling: PollingSettings,
    pub endpoints: EndpointSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    pub interval_secs: u64,
    pub lookback_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: 600,
            lookback_secs: 0,
            request_timeout_secs: 30,
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// `None` when the value does not fit a `TimeDelta`; `validate` rejects
    /// anything near that range.
    pub fn lookback(&self) -> Option<TimeDelta> {
        i64::try_from(self.lookback_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub status_url: String,
    pub bot_api_url: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            status_url: DEFAULT_STATUS_URL.to_string(),
            bot_api_url: DEFAULT_BOT_API_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("homework-bot").join("config.toml"))
    }

    /// Reads the TOML file, falling back to defaults when it does not exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path().context("Could not determine config directory")?,
        };

        if !path.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            tracing::info!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(?path, "Loaded config");
        Ok(settings)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = non_empty(&lookup, INTERVAL_OVERRIDE_VAR) {
            self.polling.interval_secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(INTERVAL_OVERRIDE_VAR, &e.to_string()))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(invalid("polling.interval_secs", "must be greater than zero"));
        }
        if self.polling.request_timeout_secs == 0 {
            return Err(invalid(
                "polling.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.polling.lookback_secs > MAX_LOOKBACK_SECS {
            return Err(invalid(
                "polling.lookback_secs",
                &format!(
                    "must be at most {MAX_LOOKBACK_SECS}, got {}",
                    self.polling.lookback_secs
                ),
            ));
        }
        for (key, url) in [
            ("endpoints.status_url", &self.endpoints.status_url),
            ("endpoints.bot_api_url", &self.endpoints.bot_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(key, &format!("expected an http(s) URL, got {url:?}")));
            }
        }
        Ok(())
    }
}

/// Secrets and chat targets. Only ever read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
    pub operator_chat_id: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("operator_chat_id", &self.operator_chat_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            practicum_token: required(&lookup, "PRACTICUM_TOKEN")?,
            telegram_token: required(&lookup, "TELEGRAM_TOKEN")?,
            chat_id: required(&lookup, "TELEGRAM_CHAT_ID")?,
            operator_chat_id: non_empty(&lookup, "OPERATOR_CHAT_ID"),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or(ConfigError::MissingVar(key))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
