//! Echo handler used by the standalone server and end-to-end tests.
//!
//! Any authenticated request is answered with a description of what the
//! server received. Requests under `/status/<code>` are answered with that
//! status instead, which lets clients exercise their error handling.

use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;

use crate::body::ResponseBody;
use crate::handler::{AuthenticatedRequest, RequestHandler};
use crate::response::{error_response, json_response};

/// What the server saw.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchoBody {
    /// Key id that signed the request.
    pub key_id: String,
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Raw query string.
    pub query: String,
    /// Hex SHA-256 of the request body.
    pub body_sha256: String,
}

/// Handler that echoes the authenticated request back.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoHandler;

#[async_trait]
impl RequestHandler for EchoHandler {
    async fn handle(&self, request: AuthenticatedRequest) -> http::Response<ResponseBody> {
        let path = request.parts.uri.path();

        if let Some(code) = path.strip_prefix("/status/") {
            return match code.parse::<u16>().ok().and_then(|c| StatusCode::from_u16(c).ok()) {
                Some(status) => {
                    error_response(status, "Requested", format!("requested status {code}"))
                }
                None => error_response(
                    StatusCode::BAD_REQUEST,
                    "InvalidStatus",
                    format!("invalid status {code}"),
                ),
            };
        }

        json_response(
            StatusCode::OK,
            &EchoBody {
                key_id: request.key_id,
                method: request.parts.method.to_string(),
                path: path.to_owned(),
                query: request.parts.uri.query().unwrap_or("").to_owned(),
                body_sha256: h3_auth::hash_payload(&request.body),
            },
        )
    }
}
