//! Error types for H3 configuration.

/// Configuration error raised before any request reaches the network.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL is empty.
    #[error("base URL is required")]
    MissingBaseUrl,

    /// The key id or the secret key is empty.
    #[error("HMAC credentials (key_id and secret_key) are required")]
    MissingCredentials,

    /// An environment variable could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Name of the offending variable.
        name: &'static str,
        /// Raw value as read from the environment.
        value: String,
    },
}

/// Convenience result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
