//! Credentials and secret lookup.
//!
//! [`Credentials`] is the client-side key pair. On the server side the secret
//! is resolved from the key id through a [`CredentialProvider`], with
//! [`StaticCredentialProvider`] for tests and single-tenant deployments.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// A key id and its shared HMAC secret.
///
/// Immutable once built. The secret is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key_id: String,
    secret_key: String,
}

impl Credentials {
    /// Create credentials from a key id and secret.
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The public key identifier.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The shared secret.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Trait for resolving a secret key from a key id.
///
/// Implementations may back this with a database, configuration file,
/// or any other credential store.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the secret for the given key id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyNotFound`] if the key id is not recognized.
    fn resolve_secret(&self, key_id: &str) -> Result<String, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use h3_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![
///     ("AK1".to_owned(), "secret".to_owned()),
/// ]);
///
/// assert_eq!(provider.resolve_secret("AK1").unwrap(), "secret");
/// ```
#[derive(Clone)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, String>,
}

impl StaticCredentialProvider {
    /// Create a provider from an iterable of (key_id, secret_key) pairs.
    pub fn new(credentials: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }
}

impl From<&Credentials> for StaticCredentialProvider {
    fn from(credentials: &Credentials) -> Self {
        Self::new([(
            credentials.key_id().to_owned(),
            credentials.secret_key().to_owned(),
        )])
    }
}

impl fmt::Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentialProvider")
            .field("key_ids", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn resolve_secret(&self, key_id: &str) -> Result<String, AuthError> {
        self.credentials
            .get(key_id)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(key_id.to_owned()))
    }
}
