//! Configuration management for the H3 client.
//!
//! Configuration is driven by environment variables, matching the provider
//! conventions (`H3_API_ENDPOINT`, `H3_KEY_ID`, `H3_SECRET_KEY`, ...).

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Endpoint used when `H3_API_ENDPOINT` is not set.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4001";

/// Per-request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles for every further retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Client configuration.
///
/// The secret key is held in memory only. It is redacted from `Debug` output
/// and skipped when serializing.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H3Config {
    /// Base URL of the API, e.g. `https://api.h3.cloud`.
    pub base_url: String,
    /// Public key identifier sent in `X-H3-Key-Id`.
    pub key_id: String,
    /// Shared HMAC secret.
    #[serde(skip_serializing, default)]
    pub secret_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub backoff_base: Duration,
}

impl Default for H3Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            key_id: String::new(),
            secret_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl fmt::Debug for H3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("H3Config")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff_base", &self.backoff_base)
            .finish()
    }
}

impl H3Config {
    /// Create a configuration with the given endpoint and credentials and
    /// default timeout and retry settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            key_id: key_id.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries after the initial attempt.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `H3_API_ENDPOINT` | `http://127.0.0.1:4001` |
    /// | `H3_KEY_ID` | *(required)* |
    /// | `H3_SECRET_KEY` | *(required)* |
    /// | `H3_TIMEOUT` | `30` (seconds) |
    /// | `H3_MAX_RETRIES` | `3` |
    ///
    /// The result is validated before it is returned.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("H3_API_ENDPOINT").filter(|v| !v.is_empty()) {
            config.base_url = v;
        }
        if let Some(v) = lookup("H3_KEY_ID") {
            config.key_id = v;
        }
        if let Some(v) = lookup("H3_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Some(v) = lookup("H3_TIMEOUT") {
            let secs = parse_number::<u64>("H3_TIMEOUT", &v)?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("H3_MAX_RETRIES") {
            config.max_retries = parse_number("H3_MAX_RETRIES", &v)?;
        }

        debug!(
            base_url = %config.base_url,
            key_id = %config.key_id,
            timeout = ?config.timeout,
            max_retries = config.max_retries,
            "loaded configuration from environment"
        );

        config.validate()
    }

    /// Check required fields and normalize defaults.
    ///
    /// A zero timeout is replaced by [`DEFAULT_TIMEOUT`] and a zero retry
    /// budget by [`DEFAULT_MAX_RETRIES`].
    pub fn validate(mut self) -> ConfigResult<Self> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        if self.key_id.is_empty() || self.secret_key.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.max_retries == 0 {
            self.max_retries = DEFAULT_MAX_RETRIES;
        }
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: value.to_owned(),
        })
}
