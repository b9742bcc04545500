//! Session configuration parsed from environment-style key lookups.
//!
//! SYSTEM CONTEXT
//! ==============
//! Server renders read the process environment; browser builds read values
//! baked in at compile time. Both paths share `from_lookup` so parsing and
//! validation behave identically.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_AUTH_TOKEN_KEY: &str = "sentinel.auth_token";
pub const DEFAULT_CSRF_TOKEN_KEY: &str = "sentinel.csrf_token";
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_EXPIRY_CHECK_SECS: u64 = 15;
/// Largest accepted duration: browser timers take a `u32` millisecond delay.
pub const MAX_DURATION_SECS: u64 = 4_294_967;
pub const DEFAULT_EXPIRY_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Header carrying the anti-forgery token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Redirect target for unauthenticated access. Matches the router's login segment.
pub const LOGIN_ROUTE: &str = "/login";
/// Landing route after a successful login.
pub const HOME_ROUTE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: expected a whole number of seconds, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },
    #[error("{key} must be at most {max} seconds, got {value}", max = MAX_DURATION_SECS)]
    DurationTooLarge { key: &'static str, value: u64 },
    #[error("{key} must not be empty")]
    EmptyKey { key: &'static str },
    #[error("auth and csrf storage keys must differ (both '{0}')")]
    SharedStorageKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// `localStorage` key for the auth token.
    pub auth_token_key: String,
    /// `sessionStorage` key for the CSRF token.
    pub csrf_token_key: String,
    pub inactivity_timeout: Duration,
    pub expiry_check_interval: Duration,
    /// Notice shown once when a session expires.
    pub expiry_message: String,
    /// Prefix for API paths; empty means same origin.
    pub api_base: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_token_key: DEFAULT_AUTH_TOKEN_KEY.to_owned(),
            csrf_token_key: DEFAULT_CSRF_TOKEN_KEY.to_owned(),
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS),
            expiry_check_interval: Duration::from_secs(DEFAULT_EXPIRY_CHECK_SECS),
            expiry_message: DEFAULT_EXPIRY_MESSAGE.to_owned(),
            api_base: String::new(),
        }
    }
}

impl SessionConfig {
    /// Build config from a key lookup, falling back to defaults per key.
    ///
    /// Recognized keys:
    /// - `SENTINEL_AUTH_TOKEN_KEY`, `SENTINEL_CSRF_TOKEN_KEY`
    /// - `SENTINEL_INACTIVITY_TIMEOUT_SECS`, `SENTINEL_EXPIRY_CHECK_SECS`
    /// - `SENTINEL_EXPIRY_MESSAGE`, `SENTINEL_API_BASE`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable or out-of-range values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let auth_token_key = non_empty("SENTINEL_AUTH_TOKEN_KEY", lookup("SENTINEL_AUTH_TOKEN_KEY"))?
            .unwrap_or(defaults.auth_token_key);
        let csrf_token_key = non_empty("SENTINEL_CSRF_TOKEN_KEY", lookup("SENTINEL_CSRF_TOKEN_KEY"))?
            .unwrap_or(defaults.csrf_token_key);
        if auth_token_key == csrf_token_key {
            return Err(ConfigError::SharedStorageKey(auth_token_key));
        }

        let inactivity_timeout = seconds("SENTINEL_INACTIVITY_TIMEOUT_SECS", lookup("SENTINEL_INACTIVITY_TIMEOUT_SECS"))?
            .unwrap_or(defaults.inactivity_timeout);
        let expiry_check_interval = seconds("SENTINEL_EXPIRY_CHECK_SECS", lookup("SENTINEL_EXPIRY_CHECK_SECS"))?
            .unwrap_or(defaults.expiry_check_interval);

        let expiry_message = lookup("SENTINEL_EXPIRY_MESSAGE")
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.expiry_message);
        let api_base = lookup("SENTINEL_API_BASE")
            .map(|b| b.trim().trim_end_matches('/').to_owned())
            .unwrap_or(defaults.api_base);

        Ok(Self {
            auth_token_key,
            csrf_token_key,
            inactivity_timeout,
            expiry_check_interval,
            expiry_message,
            api_base,
        })
    }

    /// Read overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides captured at compile time. Used by browser builds,
    /// which have no process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable or out-of-range values.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| build_env(key).map(str::to_owned))
    }

    /// Join `path` onto the configured API base.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

fn build_env(key: &str) -> Option<&'static str> {
    match key {
        "SENTINEL_AUTH_TOKEN_KEY" => option_env!("SENTINEL_AUTH_TOKEN_KEY"),
        "SENTINEL_CSRF_TOKEN_KEY" => option_env!("SENTINEL_CSRF_TOKEN_KEY"),
        "SENTINEL_INACTIVITY_TIMEOUT_SECS" => option_env!("SENTINEL_INACTIVITY_TIMEOUT_SECS"),
        "SENTINEL_EXPIRY_CHECK_SECS" => option_env!("SENTINEL_EXPIRY_CHECK_SECS"),
        "SENTINEL_EXPIRY_MESSAGE" => option_env!("SENTINEL_EXPIRY_MESSAGE"),
        "SENTINEL_API_BASE" => option_env!("SENTINEL_API_BASE"),
        _ => None,
    }
}

fn non_empty(key: &'static str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match raw.map(|v| v.trim().to_owned()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Err(ConfigError::EmptyKey { key }),
        Some(v) => Ok(Some(v)),
    }
}

fn seconds(key: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw.clone() })?;
    if secs == 0 {
        return Err(ConfigError::ZeroDuration { key });
    }
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::DurationTooLarge { key, value: secs });
    }
    Ok(Some(Duration::from_secs(secs)))
}
