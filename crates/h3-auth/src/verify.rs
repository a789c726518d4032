//! Inbound request verification.
//!
//! The verifier extracts `X-H3-Key-Id`, `X-H3-Date` and `X-H3-Signature`,
//! rebuilds the canonical request from the request as received (method,
//! path, raw query, echoed header values, body) and compares signatures using
//! constant-time comparison.
//!
//! No freshness check is applied to `X-H3-Date`; a captured request stays
//! valid for as long as the secret does.

use http::HeaderMap;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{
    HEADER_DATE, HEADER_KEY_ID, HEADER_SIGNATURE, build_canonical_request, hash_payload,
};
use crate::credentials::CredentialProvider;
use crate::error::AuthError;
use crate::signer::compute_signature;

/// The authentication headers of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeaders<'a> {
    /// Value of `X-H3-Key-Id`.
    pub key_id: &'a str,
    /// Value of `X-H3-Date`.
    pub date: &'a str,
    /// Value of `X-H3-Signature`.
    pub signature: &'a str,
}

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// The key id that signed the request.
    pub key_id: String,
    /// The signing timestamp as sent by the client.
    pub date: String,
}

/// Extract the three HMAC headers.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeaders`] naming the first header that is
/// absent, empty, or not visible ASCII.
pub fn extract_signature_headers(headers: &HeaderMap) -> Result<SignatureHeaders<'_>, AuthError> {
    Ok(SignatureHeaders {
        key_id: required_header(headers, HEADER_KEY_ID)?,
        date: required_header(headers, HEADER_DATE)?,
        signature: required_header(headers, HEADER_SIGNATURE)?,
    })
}

/// Rebuild the canonical request for an inbound request.
#[must_use]
pub fn canonical_request_for(
    parts: &http::request::Parts,
    body: &[u8],
    headers: &SignatureHeaders<'_>,
) -> String {
    build_canonical_request(
        parts.method.as_str(),
        parts.uri.path(),
        parts.uri.query().unwrap_or(""),
        headers.date,
        headers.key_id,
        &hash_payload(body),
    )
}

/// Verify an inbound request against an already resolved secret.
///
/// Returns `Ok(true)` when the signature matches and `Ok(false)` when it does
/// not.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeaders`] if any HMAC header is missing.
pub fn verify(
    parts: &http::request::Parts,
    body: &[u8],
    secret_key: &str,
) -> Result<bool, AuthError> {
    let headers = extract_signature_headers(&parts.headers)?;
    Ok(check_signature(parts, body, &headers, secret_key))
}

/// Verify an inbound request, resolving the secret through `provider`.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - An HMAC header is missing
/// - The key id is not known to the provider
/// - The signature does not match
pub fn verify_request(
    parts: &http::request::Parts,
    body: &[u8],
    provider: &dyn CredentialProvider,
) -> Result<VerifiedRequest, AuthError> {
    let headers = extract_signature_headers(&parts.headers)?;
    let secret_key = provider.resolve_secret(headers.key_id)?;

    if check_signature(parts, body, &headers, &secret_key) {
        debug!(key_id = %headers.key_id, "Signature verification succeeded");
        Ok(VerifiedRequest {
            key_id: headers.key_id.to_owned(),
            date: headers.date.to_owned(),
        })
    } else {
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Compare two hex signatures in constant time.
#[must_use]
pub fn signatures_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn check_signature(
    parts: &http::request::Parts,
    body: &[u8],
    headers: &SignatureHeaders<'_>,
    secret_key: &str,
) -> bool {
    let canonical = canonical_request_for(parts, body, headers);
    debug!(canonical_request = %canonical, "Rebuilt canonical request");

    let expected = compute_signature(secret_key, &canonical);
    let matched = signatures_match(&expected, headers.signature);
    if !matched {
        debug!(
            key_id = %headers.key_id,
            expected = %expected,
            provided = %headers.signature,
            "Signature mismatch"
        );
    }
    matched
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, AuthError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingHeaders(name))
}
