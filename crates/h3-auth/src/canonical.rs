//! Canonical request construction for H3 HMAC signatures.
//!
//! This module implements the canonical request format shared verbatim by
//! the signer and the verifier:
//!
//! ```text
//! HTTPRequestMethod\n
//! Path\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! HexSha256(Body)
//! ```
//!
//! The canonical headers are exactly `x-h3-date` and `x-h3-key-id`, one
//! `name:value` line each, sorted by line. Any divergence between the two
//! sides (header casing, query encoding, whitespace) breaks verification, so
//! every function here is pure and deterministic.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

/// Signed timestamp header (lowercase form used in the canonical string).
pub const HEADER_DATE: &str = "x-h3-date";

/// Key identifier header (lowercase form used in the canonical string).
pub const HEADER_KEY_ID: &str = "x-h3-key-id";

/// Signature header. Never part of the canonical string.
pub const HEADER_SIGNATURE: &str = "x-h3-signature";

/// Characters percent-encoded in query keys and values built by the client.
///
/// All characters except RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) are encoded.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the full canonical request string from its components.
///
/// # Examples
///
/// ```
/// use h3_auth::canonical::{build_canonical_request, hash_payload};
///
/// let canonical = build_canonical_request(
///     "GET",
///     "/v1/vms",
///     "b=2&a=1",
///     "2024-01-02T03:04:05Z",
///     "AK1",
///     &hash_payload(b""),
/// );
/// assert_eq!(
///     canonical,
///     "GET\n/v1/vms\na=1&b=2\n\
///      x-h3-date:2024-01-02T03:04:05Z\nx-h3-key-id:AK1\n\
///      e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query_string: &str,
    date: &str,
    key_id: &str,
    payload_hash: &str,
) -> String {
    let canonical_query = build_canonical_query_string(query_string);
    let canonical_headers = build_canonical_headers(&[(HEADER_DATE, date), (HEADER_KEY_ID, key_id)]);

    [
        method,
        path,
        canonical_query.as_str(),
        canonical_headers.as_str(),
        payload_hash,
    ]
    .join("\n")
}

/// Build the canonical query string from a raw query.
///
/// Each parameter is re-serialized as `key=value` with the raw bytes of the
/// query preserved (no decode or re-encode). A parameter without `=` becomes
/// `key=`. Repeated keys each produce their own pair. The pairs are sorted as
/// whole strings, not by key, and joined with `&`.
///
/// # Examples
///
/// ```
/// use h3_auth::canonical::build_canonical_query_string;
///
/// assert_eq!(build_canonical_query_string(""), "");
/// assert_eq!(build_canonical_query_string("b=2&a=1"), "a=1&b=2");
/// ```
#[must_use]
pub fn build_canonical_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| {
            let (key, value) = param.split_once('=').unwrap_or((param, ""));
            format!("{key}={value}")
        })
        .collect();

    pairs.sort_unstable();
    pairs.join("&")
}

/// Build the query string a client puts on the wire.
///
/// Keys and values are percent-encoded (unreserved characters stay literal),
/// joined as `key=value` and sorted, so the raw query the server receives is
/// already in canonical form.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use h3_auth::canonical::build_query_string;
///
/// let params = HashMap::from([
///     ("zone".to_owned(), "eu-1".to_owned()),
///     ("name".to_owned(), "my vm".to_owned()),
/// ]);
/// assert_eq!(build_query_string(&params), "name=my%20vm&zone=eu-1");
/// ```
#[must_use]
pub fn build_query_string<S: std::hash::BuildHasher>(params: &HashMap<String, String, S>) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_query_component(k), encode_query_component(v)))
        .collect();

    pairs.sort_unstable();
    pairs.join("&")
}

/// Build the canonical headers block from `(name, value)` pairs.
///
/// Names are lowercased and each pair becomes a `name:value` line. Lines are
/// sorted and joined with a newline; no trailing newline is added. Values are
/// used verbatim.
///
/// # Examples
///
/// ```
/// use h3_auth::canonical::build_canonical_headers;
///
/// let result = build_canonical_headers(&[("X-H3-Key-Id", "AK1"), ("X-H3-Date", "2024-01-02T03:04:05Z")]);
/// assert_eq!(result, "x-h3-date:2024-01-02T03:04:05Z\nx-h3-key-id:AK1");
/// ```
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{}:{value}", name.to_lowercase()))
        .collect();

    lines.sort_unstable();
    lines.join("\n")
}

/// Compute the SHA-256 hash of the given payload as a lowercase hex string.
///
/// # Examples
///
/// ```
/// use h3_auth::canonical::hash_payload;
///
/// // SHA-256 of empty payload
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Percent-encode a single query key or value.
fn encode_query_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ENCODE_SET).to_string()
}
