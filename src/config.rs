use std::{env, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
    #[error("{name} has invalid value {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` is not fatal at startup; every delivery fails until it is set.
    pub primary_webhook_url: Option<Url>,
    pub debug_webhook_url: Option<Url>,
    pub webhook_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
    /// JSON logs go here when set, stdout otherwise.
    pub log_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            primary_webhook_url: None,
            debug_webhook_url: None,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        Ok(AppConfig {
            host: var("AXUM_HOST").unwrap_or(defaults.host),
            port: parse_number("AXUM_PORT", var("AXUM_PORT"))?.unwrap_or(defaults.port),
            primary_webhook_url: parse_url("DISCORD_WEBHOOK_URL", var("DISCORD_WEBHOOK_URL"))?,
            debug_webhook_url: parse_url("DISCORD_DEBUG_WEBHOOK_URL", var("DISCORD_DEBUG_WEBHOOK_URL"))?,
            webhook_timeout: parse_number("WEBHOOK_TIMEOUT_SECS", var("WEBHOOK_TIMEOUT_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.webhook_timeout),
            request_timeout: parse_number("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_bytes: parse_number("MAX_BODY_BYTES", var("MAX_BODY_BYTES"))?.unwrap_or(defaults.max_body_bytes),
            log_path: var("LOG_PATH").map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_url(name: &'static str, value: Option<String>) -> Result<Option<Url>, ConfigError> {
    value
        .map(|v| Url::parse(&v).map_err(|e| ConfigError::InvalidUrl {
            name,
            reason: e.to_string(),
        }))
        .transpose()
}

fn parse_number<T: FromStr>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| v.parse::<T>().map_err(|_| ConfigError::InvalidNumber { name, value: v }))
        .transpose()
}
