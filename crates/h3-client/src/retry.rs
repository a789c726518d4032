//! Retry state machine.
//!
//! A call moves through `Signed -> Attempting -> {Success | Retryable |
//! Terminal}`. [`classify`] maps the result of one attempt to an
//! [`AttemptOutcome`]; [`RetryState`] decides whether a retryable outcome
//! leads to another attempt (and how long to wait first) or ends the call.
//! Neither touches the network, so the whole policy is testable on its own.

use std::time::Duration;

use bytes::Bytes;

use crate::error::{AttemptError, ClientError, HttpError};
use crate::transport::{PreparedRequest, TransportError, TransportResponse};

/// Exponential backoff without jitter: `base * 2^(attempt-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    /// Backoff starting at `base` for the first retry.
    #[must_use]
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before `attempt` (0-indexed; the initial attempt has no delay).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use h3_client::Backoff;
    ///
    /// let backoff = Backoff::new(Duration::from_secs(1));
    /// assert_eq!(backoff.delay_for_attempt(0), Duration::ZERO);
    /// assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(4));
    /// ```
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }
}

/// The classified result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx or 3xx; carries the response body.
    Success(Bytes),
    /// Transport failure or 5xx.
    Retryable(AttemptError),
    /// 4xx.
    Terminal(HttpError),
}

/// Classify the result of sending `request` once.
#[must_use]
pub fn classify(
    request: &PreparedRequest,
    result: Result<TransportResponse, TransportError>,
) -> AttemptOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return AttemptOutcome::Retryable(e.into()),
    };

    let status = response.status.as_u16();
    let body = || String::from_utf8_lossy(&response.body).into_owned();

    if status >= 500 {
        AttemptOutcome::Retryable(AttemptError::Server {
            status,
            body: body(),
        })
    } else if status >= 400 {
        AttemptOutcome::Terminal(HttpError {
            status_code: status,
            method: request.method.to_string(),
            url: request.url.to_string(),
            body: body(),
        })
    } else {
        AttemptOutcome::Success(response.body)
    }
}

/// What to do after a retryable failure.
#[derive(Debug)]
pub enum RetryDecision {
    /// Wait `delay`, then make attempt number `attempt` (0-indexed).
    Retry {
        /// The attempt about to be made.
        attempt: u32,
        /// Backoff before it.
        delay: Duration,
    },
    /// The retry budget is spent.
    Exhausted(ClientError),
}

/// Retry bookkeeping scoped to one call.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    max_retries: u32,
    backoff: Backoff,
}

impl RetryState {
    /// Fresh state before the initial attempt.
    #[must_use]
    pub fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            attempt: 0,
            max_retries,
            backoff,
        }
    }

    /// The current attempt (0-indexed).
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a retryable failure of the current attempt.
    pub fn on_retryable(&mut self, error: AttemptError) -> RetryDecision {
        if self.attempt >= self.max_retries {
            return RetryDecision::Exhausted(ClientError::RetriesExhausted {
                retries: self.max_retries,
                last_error: error,
            });
        }

        self.attempt += 1;
        RetryDecision::Retry {
            attempt: self.attempt,
            delay: self.backoff.delay_for_attempt(self.attempt),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, Method, StatusCode};

    use super::*;

    fn request() -> PreparedRequest {
        PreparedRequest {
            method: Method::DELETE,
            url: "http://api.h3.cloud/v1/vms/abc?force=true".parse().unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    fn response(status: u16, body: &'static str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    #[test]
    fn test_should_double_backoff_per_retry() {
        let backoff = Backoff::new(Duration::from_secs(1));
        let delays: Vec<Duration> = (0..5).map(|a| backoff.delay_for_attempt(a)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[test]
    fn test_should_saturate_backoff_for_huge_attempts() {
        let backoff = Backoff::new(Duration::from_secs(1));
        assert_eq!(
            backoff.delay_for_attempt(40),
            Duration::from_secs(u64::from(u32::MAX))
        );
        assert_eq!(
            Backoff::new(Duration::MAX).delay_for_attempt(3),
            Duration::MAX
        );
    }

    #[test]
    fn test_should_classify_success_statuses() {
        assert!(matches!(
            classify(&request(), response(200, r#"{"id":"abc"}"#)),
            AttemptOutcome::Success(body) if &body[..] == br#"{"id":"abc"}"#
        ));
        assert!(matches!(
            classify(&request(), response(304, "")),
            AttemptOutcome::Success(_)
        ));
    }

    #[test]
    fn test_should_classify_client_error_as_terminal() {
        let outcome = classify(&request(), response(404, "no such vm"));
        let AttemptOutcome::Terminal(err) = outcome else {
            panic!("expected terminal outcome");
        };
        assert_eq!(err.status_code, 404);
        assert_eq!(err.method, "DELETE");
        assert_eq!(err.url, "http://api.h3.cloud/v1/vms/abc?force=true");
        assert_eq!(err.body, "no such vm");
    }

    #[test]
    fn test_should_classify_server_error_as_retryable() {
        let outcome = classify(&request(), response(503, "overloaded"));
        assert!(matches!(
            outcome,
            AttemptOutcome::Retryable(AttemptError::Server { status: 503, ref body }) if body == "overloaded"
        ));
    }

    #[test]
    fn test_should_classify_transport_failure_as_retryable() {
        let outcome = classify(
            &request(),
            Err(TransportError::Body("connection reset".to_owned())),
        );
        assert!(matches!(
            outcome,
            AttemptOutcome::Retryable(AttemptError::Transport(TransportError::Body(_)))
        ));
    }

    #[test]
    fn test_should_allow_max_retries_plus_one_attempts() {
        let mut state = RetryState::new(3, Backoff::new(Duration::from_secs(1)));
        let server_error = || AttemptError::Server {
            status: 500,
            body: String::new(),
        };

        let mut delays = Vec::new();
        loop {
            match state.on_retryable(server_error()) {
                RetryDecision::Retry { delay, .. } => delays.push(delay),
                RetryDecision::Exhausted(err) => {
                    assert!(matches!(err, ClientError::RetriesExhausted { retries: 3, .. }));
                    break;
                }
            }
        }

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
        assert_eq!(state.attempt(), 3);
    }

    #[test]
    fn test_should_exhaust_immediately_without_retries() {
        let mut state = RetryState::new(0, Backoff::new(Duration::from_secs(1)));
        let decision = state.on_retryable(AttemptError::Transport(TransportError::Request(
            "refused".to_owned(),
        )));
        assert!(matches!(
            decision,
            RetryDecision::Exhausted(ClientError::RetriesExhausted { retries: 0, .. })
        ));
    }
}
