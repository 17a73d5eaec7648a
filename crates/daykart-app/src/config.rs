//! Environment-driven configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use daykart_events::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_MIRROR_CAPACITY, DEFAULT_QUEUE_CAPACITY, EventManagerConfig,
};
use daykart_notify::DEFAULT_NOTIFICATION_TTL;

use crate::error::AppError;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::Config(format!(
                "DAYKART_LOG_FORMAT must be json or pretty, got {other:?}"
            ))),
        }
    }
}

/// Storefront settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file backing the key/value store; in-memory when absent.
    pub storage_path: Option<PathBuf>,
    /// Events kept in memory for replay.
    pub event_queue_capacity: usize,
    /// Events kept in the persisted mirror.
    pub mirror_capacity: usize,
    /// Messages a slow tab may fall behind by on the broadcast channel.
    pub broadcast_capacity: usize,
    /// How long product notifications stay up.
    pub notification_ttl: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            event_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            mirror_capacity: DEFAULT_MIRROR_CAPACITY,
            broadcast_capacity: DEFAULT_CHANNEL_CAPACITY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from `DAYKART_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Unset or blank variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value cannot be parsed or a capacity
    /// is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let config = Self {
            storage_path: get("DAYKART_STORAGE_PATH").map(PathBuf::from),
            event_queue_capacity: capacity(
                "DAYKART_EVENT_QUEUE_CAPACITY",
                get("DAYKART_EVENT_QUEUE_CAPACITY"),
                defaults.event_queue_capacity,
            )?,
            mirror_capacity: capacity(
                "DAYKART_MIRROR_CAPACITY",
                get("DAYKART_MIRROR_CAPACITY"),
                defaults.mirror_capacity,
            )?,
            broadcast_capacity: capacity(
                "DAYKART_BROADCAST_CAPACITY",
                get("DAYKART_BROADCAST_CAPACITY"),
                defaults.broadcast_capacity,
            )?,
            notification_ttl: match get("DAYKART_NOTIFICATION_TTL_SECS") {
                Some(raw) => Duration::from_secs(raw.parse().map_err(|e| {
                    AppError::Config(format!(
                        "DAYKART_NOTIFICATION_TTL_SECS must be a whole number of seconds: {e}"
                    ))
                })?),
                None => defaults.notification_ttl,
            },
            log_format: match get("DAYKART_LOG_FORMAT") {
                Some(raw) => raw.parse()?,
                None => defaults.log_format,
            },
        };
        Ok(config)
    }

    /// Event manager settings derived from this configuration.
    #[must_use]
    pub fn event_manager_config(&self) -> EventManagerConfig {
        EventManagerConfig {
            queue_capacity: self.event_queue_capacity,
            mirror_capacity: self.mirror_capacity,
            ..EventManagerConfig::default()
        }
    }
}

fn capacity(key: &str, raw: Option<String>, default: usize) -> Result<usize, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: usize = raw
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be a positive integer: {e}")))?;
    if value == 0 {
        return Err(AppError::Config(format!("{key} must be at least 1")));
    }
    Ok(value)
}
