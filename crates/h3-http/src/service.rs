//! Verifying HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use h3_auth::CredentialProvider;
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tracing::{debug, warn};

use crate::body::ResponseBody;
use crate::handler::{AuthenticatedRequest, RequestHandler};
use crate::response::{CONTENT_TYPE, auth_error_response, error_response, json_response};

/// Paths answered without authentication.
const HEALTH_PATHS: &[&str] = &["/health", "/_health"];

/// Configuration for the verifying service.
#[derive(Clone)]
pub struct VerifyingHttpConfig {
    /// Secret lookup for inbound key ids.
    pub credential_provider: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for VerifyingHttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyingHttpConfig")
            .field("credential_provider", &"...")
            .finish()
    }
}

/// Hyper `Service` that verifies HMAC signatures before dispatching to `H`.
#[derive(Debug)]
pub struct VerifyingService<H: RequestHandler> {
    handler: Arc<H>,
    config: Arc<VerifyingHttpConfig>,
}

impl<H: RequestHandler> VerifyingService<H> {
    /// Create a new `VerifyingService`.
    pub fn new(handler: Arc<H>, config: VerifyingHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }
}

impl<H: RequestHandler> Clone for VerifyingService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: RequestHandler> hyper::service::Service<http::Request<Incoming>> for VerifyingService<H> {
    type Response = http::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, handler.as_ref(), &config).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process one request: health check, body collection, verification, dispatch.
pub async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    config: &VerifyingHttpConfig,
) -> http::Response<ResponseBody>
where
    H: RequestHandler,
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    if req.method() == http::Method::GET && HEALTH_PATHS.contains(&req.uri().path()) {
        return json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }));
    }

    let (parts, incoming) = req.into_parts();

    let body = match incoming.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "InvalidBody",
                format!("failed to read request body: {e}"),
            );
        }
    };

    let verified = match h3_auth::verify_request(&parts, &body, config.credential_provider.as_ref())
    {
        Ok(verified) => verified,
        Err(err) => {
            warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                error = %err,
                "Rejected unauthenticated request"
            );
            return auth_error_response(&err);
        }
    };

    debug!(
        key_id = %verified.key_id,
        method = %parts.method,
        path = %parts.uri.path(),
        "Authenticated request"
    );

    handler
        .handle(AuthenticatedRequest {
            parts,
            body,
            key_id: verified.key_id,
        })
        .await
}

/// Add headers present on every response.
fn add_common_headers(
    mut response: http::Response<ResponseBody>,
    request_id: &str,
) -> http::Response<ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }

    headers
        .entry(http::header::CONTENT_TYPE)
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    response
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use h3_auth::{Credentials, Signer, StaticCredentialProvider};
    use http_body_util::Full;

    use super::*;

    struct EchoKeyHandler;

    #[async_trait]
    impl RequestHandler for EchoKeyHandler {
        async fn handle(&self, request: AuthenticatedRequest) -> http::Response<ResponseBody> {
            json_response(
                StatusCode::OK,
                &serde_json::json!({ "keyId": request.key_id, "size": request.body.len() }),
            )
        }
    }

    fn config() -> VerifyingHttpConfig {
        VerifyingHttpConfig {
            credential_provider: Arc::new(StaticCredentialProvider::new(vec![(
                "AK1".to_owned(),
                "secret".to_owned(),
            )])),
        }
    }

    fn signed_request(body: &'static [u8], secret: &str) -> http::Request<Full<Bytes>> {
        let signed = Signer::new(Credentials::new("AK1", secret)).sign("POST", "/v1/vms", "", body);
        let mut request = http::Request::builder()
            .method("POST")
            .uri("http://localhost/v1/vms")
            .body(Full::new(Bytes::from_static(body)))
            .unwrap();
        signed.apply(request.headers_mut()).unwrap();
        request
    }

    async fn json_body(response: http::Response<ResponseBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_dispatch_verified_request() {
        let response =
            process_request(signed_request(b"{\"a\":1}", "secret"), &EchoKeyHandler, &config())
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["keyId"], "AK1");
        assert_eq!(json["size"], 7);
    }

    #[tokio::test]
    async fn test_should_reject_request_signed_with_wrong_secret() {
        let response =
            process_request(signed_request(b"{}", "wrong"), &EchoKeyHandler, &config()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "SignatureDoesNotMatch");
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request() {
        let request = http::Request::builder()
            .method("GET")
            .uri("http://localhost/v1/vms")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = process_request(request, &EchoKeyHandler, &config()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "MissingHeaders");
    }

    #[tokio::test]
    async fn test_should_answer_health_check_without_auth() {
        let request = http::Request::builder()
            .method("GET")
            .uri("http://localhost/health")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = process_request(request, &EchoKeyHandler, &config()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[test]
    fn test_should_add_common_headers() {
        let response = add_common_headers(http::Response::new(ResponseBody::empty()), "req-1");
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-1");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}
