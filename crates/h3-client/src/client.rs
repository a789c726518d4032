//! HMAC-signed client with retry and exponential backoff.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use h3_auth::canonical::build_query_string;
use h3_auth::{Credentials, Signer};
use h3_core::H3Config;
use http::{HeaderMap, Method};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::{ClientError, ClientResult};
use crate::retry::{AttemptOutcome, Backoff, RetryDecision, RetryState, classify};
use crate::transport::{PreparedRequest, ReqwestTransport, Transport};

/// HTTP client that signs every request and retries transient failures.
///
/// Cloning is cheap; clones share the credentials and the connection pool.
/// Concurrent calls are independent: each owns its request, timestamp and
/// retry counter.
#[derive(Clone)]
pub struct Client {
    base_url: Arc<str>,
    signer: Arc<Signer>,
    transport: Arc<dyn Transport>,
    max_retries: u32,
    backoff: Backoff,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("key_id", &self.signer.key_id())
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client backed by a pooled `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::Config`] if the base URL or credentials are
    /// missing; nothing is sent in that case.
    pub fn new(config: H3Config) -> ClientResult<Self> {
        let config = config.validate()?;
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(|e| ClientError::TransportInit(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client from `H3_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(H3Config::from_env()?)
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: H3Config, transport: Arc<dyn Transport>) -> ClientResult<Self> {
        let config = config.validate()?;
        Url::parse(&config.base_url).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let signer = Signer::new(Credentials::new(config.key_id, config.secret_key));

        Ok(Self {
            base_url: Arc::from(config.base_url),
            signer: Arc::new(signer),
            transport,
            max_retries: config.max_retries,
            backoff: Backoff::new(config.backoff_base),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a signed request and return the raw response body.
    ///
    /// `body` is serialized as JSON; `None` sends an empty body.
    pub async fn execute<B>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &HashMap<String, String>,
        body: Option<&B>,
    ) -> ClientResult<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let payload = match body {
            Some(body) => Bytes::from(serde_json::to_vec(body).map_err(ClientError::Marshal)?),
            None => Bytes::new(),
        };

        let request = self.prepare(method, path, query, payload)?;
        self.send_with_retry(ctx, &request).await
    }

    /// Execute a signed request and decode a non-empty response into `result`.
    ///
    /// An empty success body leaves `result` untouched.
    pub async fn execute_into<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &HashMap<String, String>,
        body: Option<&B>,
        result: Option<&mut T>,
    ) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(ctx, method, path, query, body).await?;
        if let Some(result) = result {
            if let Some(decoded) = decode(&response)? {
                *result = decoded;
            }
        }
        Ok(())
    }

    /// Execute a signed request and decode the response, `None` if it is empty.
    pub async fn execute_json<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &HashMap<String, String>,
        body: Option<&B>,
    ) -> ClientResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(ctx, method, path, query, body).await?;
        decode(&response)
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &HashMap<String, String>,
    ) -> ClientResult<Option<T>> {
        self.execute_json(ctx, Method::GET, path, query, None::<&()>)
            .await
    }

    /// `POST path` with a JSON body.
    pub async fn post<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> ClientResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_json(ctx, Method::POST, path, &HashMap::new(), Some(body))
            .await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> ClientResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_json(ctx, Method::PUT, path, &HashMap::new(), Some(body))
            .await
    }

    /// `DELETE path`, discarding any response body.
    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> ClientResult<()> {
        self.execute(ctx, Method::DELETE, path, &HashMap::new(), None::<&()>)
            .await
            .map(|_| ())
    }

    /// Build the URL and sign the request. Runs once per call.
    fn prepare(
        &self,
        method: Method,
        path: &str,
        query: &HashMap<String, String>,
        body: Bytes,
    ) -> ClientResult<PreparedRequest> {
        let mut raw_url = format!("{}{path}", self.base_url);
        if !query.is_empty() {
            raw_url.push('?');
            raw_url.push_str(&build_query_string(query));
        }

        let url = Url::parse(&raw_url).map_err(|e| ClientError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        // Sign what goes on the wire: the parsed URL's path and query.
        let signed = self.signer.sign(
            method.as_str(),
            url.path(),
            url.query().unwrap_or(""),
            &body,
        );

        let mut headers = HeaderMap::new();
        signed.apply(&mut headers)?;

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send an already signed request until it succeeds, fails terminally,
    /// exhausts its retries, or the context is done.
    async fn send_with_retry(
        &self,
        ctx: &RequestContext,
        request: &PreparedRequest,
    ) -> ClientResult<Bytes> {
        let mut state = RetryState::new(self.max_retries, self.backoff);

        loop {
            debug!(
                method = %request.method,
                url = %request.url,
                attempt = state.attempt(),
                "Sending signed request"
            );

            let result = tokio::select! {
                biased;
                err = ctx.done() => return Err(err),
                result = self.transport.send(request) => result,
            };

            let error = match classify(request, result) {
                AttemptOutcome::Success(body) => return Ok(body),
                AttemptOutcome::Terminal(err) => {
                    debug!(status = err.status_code, url = %err.url, "Client error, not retrying");
                    return Err(err.into());
                }
                AttemptOutcome::Retryable(err) => err,
            };

            match state.on_retryable(error) {
                RetryDecision::Retry { attempt, delay } => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retryable failure, backing off"
                    );
                    tokio::select! {
                        biased;
                        err = ctx.done() => return Err(err),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::Exhausted(err) => {
                    warn!(method = %request.method, url = %request.url, error = %err, "Retries exhausted");
                    return Err(err);
                }
            }
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ClientResult<Option<T>> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(ClientError::Unmarshal)
}
