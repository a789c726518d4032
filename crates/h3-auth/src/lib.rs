//! HMAC-SHA256 request authentication for the H3 API.
//!
//! This crate implements both sides of the H3 signing scheme. A client signs
//! every outbound request with a shared secret; the server rebuilds the same
//! canonical string from the inbound request and compares signatures in
//! constant time.
//!
//! # Overview
//!
//! The canonical request is five newline-joined fields:
//!
//! ```text
//! METHOD
//! PATH
//! SORTED_QUERY
//! x-h3-date:<timestamp>
//! x-h3-key-id:<key id>
//! HEX(SHA256(BODY))
//! ```
//!
//! (the signed headers occupy two lines of the fourth field). The signature
//! is `hex(HMAC-SHA256(secret, canonical))`, sent in `X-H3-Signature`.
//!
//! # Usage
//!
//! ```rust
//! use h3_auth::{Credentials, Signer, StaticCredentialProvider, verify_request};
//!
//! let signer = Signer::new(Credentials::new("AK1", "secret"));
//! let signed = signer.sign("GET", "/v1/vms", "", b"");
//!
//! let mut request = http::Request::builder()
//!     .method("GET")
//!     .uri("http://api.h3.cloud/v1/vms")
//!     .body(())
//!     .unwrap();
//! signed.apply(request.headers_mut()).unwrap();
//!
//! let provider = StaticCredentialProvider::new(vec![("AK1".to_owned(), "secret".to_owned())]);
//! let (parts, ()) = request.into_parts();
//! let verified = verify_request(&parts, b"", &provider).unwrap();
//! assert_eq!(verified.key_id, "AK1");
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction shared by signer and verifier
//! - [`credentials`] - Credentials and the secret lookup trait
//! - [`error`] - Authentication error types
//! - [`signer`] - Outbound request signing
//! - [`verify`] - Inbound request verification

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod signer;
pub mod verify;

pub use canonical::{
    HEADER_DATE, HEADER_KEY_ID, HEADER_SIGNATURE, build_canonical_request, hash_payload,
};
pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use signer::{SignedHeaders, Signer, compute_signature};
pub use verify::{VerifiedRequest, verify, verify_request};
