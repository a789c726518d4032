//! Core configuration for the H3 HMAC-authenticated API client.
//!
//! This crate holds the pieces shared by the client and the verifying server:
//! the [`H3Config`] surface (base URL, credentials, timeout, retry budget) and
//! the [`ConfigError`] raised when that surface is incomplete.

mod config;
mod error;

pub use config::{
    DEFAULT_BACKOFF_BASE, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, H3Config,
};
pub use error::{ConfigError, ConfigResult};
