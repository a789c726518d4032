//! Client error types.

use h3_auth::AuthError;
use h3_core::ConfigError;

use crate::transport::TransportError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Terminal error for a 4xx response. Never retried.
///
/// The response body is kept verbatim so callers can render or inspect it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status_code}: {method} {url} - {body}")]
pub struct HttpError {
    /// HTTP status code.
    pub status_code: u16,
    /// Request method.
    pub method: String,
    /// Full request URL including the query string.
    pub url: String,
    /// Response body.
    pub body: String,
}

impl HttpError {
    /// Whether the server answered `404 Not Found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    /// Whether the server answered `401 Unauthorized`.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }
}

/// A failure of a single attempt that is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// Connection error, timeout, or body read failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a 5xx status.
    #[error("server error ({status}): {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Errors returned by [`crate::Client`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The base URL and path do not form a valid URL.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP transport: {0}")]
    TransportInit(String),

    /// The request body could not be serialized.
    #[error("failed to marshal request body: {0}")]
    Marshal(#[source] serde_json::Error),

    /// A successful response body could not be decoded.
    #[error("failed to unmarshal response: {0}")]
    Unmarshal(#[source] serde_json::Error),

    /// The signed headers could not be attached to the request.
    #[error("failed to sign request: {0}")]
    Sign(#[from] AuthError),

    /// The server answered with a 4xx status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Every attempt failed with a retryable error.
    #[error("request failed after {retries} retries: {last_error}")]
    RetriesExhausted {
        /// Configured retry budget (attempts made is `retries + 1`).
        retries: u32,
        /// The error of the final attempt.
        #[source]
        last_error: AttemptError,
    },

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline passed before the request completed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// The HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => Some(e.status_code),
            Self::RetriesExhausted {
                last_error: AttemptError::Server { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a `404 Not Found` client error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_not_found())
    }

    /// Whether this is a `401 Unauthorized` client error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_unauthorized())
    }

    /// Whether the caller cancelled the request or its deadline passed.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
