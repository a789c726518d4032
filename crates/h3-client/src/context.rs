//! Per-call cancellation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Cancellation signal for one call: an explicit token plus an optional
/// deadline.
///
/// Clones share the same token, so cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled unless [`RequestContext::cancel`]
    /// is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context driven by an existing token, e.g. a child of a shutdown token.
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline_at(Instant::now() + timeout)
    }

    /// The underlying token.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel the call.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The cancellation cause if the context is already done.
    #[must_use]
    pub fn err(&self) -> Option<ClientError> {
        if self.token.is_cancelled() {
            Some(ClientError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(ClientError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolve with the cancellation cause once the context is done.
    pub async fn done(&self) -> ClientError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => ClientError::Cancelled,
                    () = tokio::time::sleep_until(deadline) => ClientError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ClientError::Cancelled
            }
        }
    }
}
