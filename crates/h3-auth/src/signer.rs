//! Outbound request signing.
//!
//! A request is signed once: the timestamp is taken at signing time and the
//! resulting [`SignedHeaders`] are replayed unchanged on every retry.

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, KeyInit, Mac};
use http::HeaderMap;
use http::header::{CONTENT_TYPE, HeaderValue};
use sha2::Sha256;
use tracing::debug;

use crate::canonical::{
    HEADER_DATE, HEADER_KEY_ID, HEADER_SIGNATURE, build_canonical_request, hash_payload,
};
use crate::credentials::Credentials;
use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Content type attached to every signed request. Not covered by the signature.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The authentication headers produced by signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Value of `X-H3-Key-Id`.
    pub key_id: String,
    /// Value of `X-H3-Date` (UTC, RFC3339).
    pub date: String,
    /// Value of `X-H3-Signature` (hex HMAC-SHA256).
    pub signature: String,
}

impl SignedHeaders {
    /// Write `Content-Type`, `X-H3-Key-Id`, `X-H3-Date` and `X-H3-Signature`
    /// into `headers`, replacing any previous values.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(HEADER_KEY_ID, header_value(HEADER_KEY_ID, &self.key_id)?);
        headers.insert(HEADER_DATE, header_value(HEADER_DATE, &self.date)?);
        headers.insert(
            HEADER_SIGNATURE,
            header_value(HEADER_SIGNATURE, &self.signature)?,
        );
        Ok(())
    }
}

/// Signs requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    /// Create a signer for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// The key id this signer signs with.
    #[must_use]
    pub fn key_id(&self) -> &str {
        self.credentials.key_id()
    }

    /// Sign a request using the current UTC time.
    ///
    /// `query` is the raw query string exactly as it will appear on the wire.
    #[must_use]
    pub fn sign(&self, method: &str, path: &str, query: &str, body: &[u8]) -> SignedHeaders {
        self.sign_at(method, path, query, body, Utc::now())
    }

    /// Sign a request with an explicit timestamp.
    #[must_use]
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        query: &str,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> SignedHeaders {
        let date = format_timestamp(timestamp);
        let key_id = self.credentials.key_id();

        let canonical =
            build_canonical_request(method, path, query, &date, key_id, &hash_payload(body));
        debug!(canonical_request = %canonical, "Built canonical request");

        let signature = compute_signature(self.credentials.secret_key(), &canonical);

        SignedHeaders {
            key_id: key_id.to_owned(),
            date,
            signature,
        }
    }
}

/// Compute `hex(HMAC-SHA256(secret_key, canonical))`.
///
/// # Examples
///
/// ```
/// use h3_auth::signer::compute_signature;
///
/// let sig = compute_signature("secret", "GET\n/\n\nx-h3-date:d\nx-h3-key-id:k\n");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
pub fn compute_signature(secret_key: &str, canonical: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept keys of any length");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Format a timestamp as RFC3339 with second precision and a `Z` suffix.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|_| AuthError::InvalidHeaderValue(name))
}
