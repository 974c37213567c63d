//! Bot configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub db_path: PathBuf,
    pub photo_dir: PathBuf,
    /// Idle time after which an unfinished dialog is dropped
    pub dialog_ttl: Duration,
    /// Long-poll timeout passed to `getUpdates`
    pub poll_timeout: Duration,
    pub api_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = var("PORTFOLIO_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("PORTFOLIO_BOT_TOKEN"))?;

        let db_path = var("PORTFOLIO_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(format!("{home}/.portfolio-bot/portfolio.db"))
            },
            PathBuf::from,
        );

        let seconds = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match var(name) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidSeconds { name, value }),
            }
        };

        Ok(Self {
            token,
            db_path,
            photo_dir: var("PORTFOLIO_PHOTO_DIR")
                .map_or_else(|| PathBuf::from("project_photos"), PathBuf::from),
            dialog_ttl: seconds("PORTFOLIO_DIALOG_TTL_SECS", 3600)?,
            poll_timeout: seconds("PORTFOLIO_POLL_TIMEOUT_SECS", 30)?,
            api_url: var("PORTFOLIO_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
        })
    }
}
