//! HMAC-signed HTTP client for the H3 API.
//!
//! Every request goes through one path: the JSON body is serialized, the
//! request is signed once with [`h3_auth::Signer`], and the signed request is
//! sent through a [`Transport`] until it succeeds, fails with a client error,
//! or runs out of retries.
//!
//! | Outcome | Retried | Result |
//! |---------|---------|--------|
//! | 2xx / 3xx | no | body decoded into the caller's type |
//! | 4xx | no | [`ClientError::Http`] carrying the status and body |
//! | 5xx | yes | [`ClientError::RetriesExhausted`] once the budget is spent |
//! | connection error, timeout, body read error | yes | as above |
//!
//! Retries wait `backoff_base * 2^(n-1)` before retry `n`. Both the wait and
//! the in-flight request are abandoned as soon as the caller's
//! [`RequestContext`] is cancelled or its deadline passes.
//!
//! # Usage
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use h3_client::{Client, RequestContext};
//! use h3_core::H3Config;
//!
//! #[derive(serde::Deserialize)]
//! struct Vm {
//!     id: String,
//! }
//!
//! # async fn run() -> Result<(), h3_client::ClientError> {
//! let client = Client::new(H3Config::new("https://api.h3.cloud", "AK1", "secret"))?;
//! let ctx = RequestContext::new();
//! let vm: Option<Vm> = client.get(&ctx, "/v1/vms/abc", &HashMap::new()).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod context;
mod error;
mod retry;
mod transport;

pub use client::Client;
pub use context::RequestContext;
pub use error::{AttemptError, ClientError, ClientResult, HttpError};
pub use retry::{AttemptOutcome, Backoff, RetryDecision, RetryState, classify};
pub use transport::{
    PreparedRequest, ReqwestTransport, Transport, TransportError, TransportResponse,
};
