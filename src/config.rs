//! Server configuration from the environment

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Settings read once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Remote chat backend; the in-process assistant is used when unset
    pub backend_url: Option<String>,
    /// Outbound request timeout, none by default
    pub request_timeout: Option<Duration>,
    pub allowed_origins: Vec<String>,
    /// Unwatched sessions untouched this long are dropped
    pub session_idle: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: None,
            request_timeout: None,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            session_idle: DEFAULT_SESSION_IDLE,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("THINKR_PORT") {
            config.port = parse_number("THINKR_PORT", &value)?;
        }

        config.backend_url = get("THINKR_BACKEND_URL").map(|url| url.trim().to_string());

        if let Some(value) = get("THINKR_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Some(parse_secs("THINKR_REQUEST_TIMEOUT_SECS", &value)?);
        }

        if let Some(value) = get("THINKR_SESSION_IDLE_SECS") {
            config.session_idle = parse_secs("THINKR_SESSION_IDLE_SECS", &value)?;
        }

        if let Some(value) = get("THINKR_ALLOWED_ORIGINS") {
            config.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match parse_number(name, value)? {
        0 => Err(ConfigError::Zero { name }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
