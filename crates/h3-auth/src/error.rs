//! Error types for H3 HMAC authentication.
//!
//! A signature that simply does not match is reported through
//! [`AuthError::SignatureDoesNotMatch`] only by [`crate::verify_request`];
//! [`crate::verify`] returns `Ok(false)` instead. Header extraction failures
//! are always reported as [`AuthError::MissingHeaders`].

/// Errors that can occur while signing or verifying H3 requests.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// A required HMAC header is absent, empty, or not valid text.
    #[error("missing required HMAC header: {0}")]
    MissingHeaders(&'static str),

    /// The key id was not found in the credential store.
    #[error("key id not found: {0}")]
    KeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("signature does not match")]
    SignatureDoesNotMatch,

    /// A signed value cannot be carried in an HTTP header.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(&'static str),
}
