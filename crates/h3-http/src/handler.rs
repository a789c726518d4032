//! Handler trait for authenticated requests.

use async_trait::async_trait;
use bytes::Bytes;

use crate::body::ResponseBody;

/// A request whose signature has been verified.
#[derive(Debug)]
pub struct AuthenticatedRequest {
    /// Request head.
    pub parts: http::request::Parts,
    /// Buffered request body.
    pub body: Bytes,
    /// Key id that signed the request.
    pub key_id: String,
}

/// Application logic behind the verifying service.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle one authenticated request.
    async fn handle(&self, request: AuthenticatedRequest) -> http::Response<ResponseBody>;
}
