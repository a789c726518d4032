//! JSON response helpers.

use h3_auth::AuthError;
use http::StatusCode;
use serde::Serialize;

use crate::body::ResponseBody;

/// Content type of every response.
pub const CONTENT_TYPE: &str = "application/json";

/// Error payload returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    /// Machine-readable error code.
    pub error: &'a str,
    /// Human-readable message.
    pub message: String,
}

/// Serialize `value` as a JSON response with the given status.
#[must_use]
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> http::Response<ResponseBody> {
    match serde_json::to_vec(value) {
        Ok(json) => build(status, ResponseBody::from_bytes(json)),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalError",
            format!("failed to encode response: {e}"),
        ),
    }
}

/// Build a JSON error response.
#[must_use]
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> http::Response<ResponseBody> {
    let body = ErrorBody {
        error: code,
        message: message.into(),
    };
    let json = serde_json::to_vec(&body).unwrap_or_default();
    build(status, ResponseBody::from_bytes(json))
}

/// Map an authentication failure to a `401` response.
#[must_use]
pub fn auth_error_response(err: &AuthError) -> http::Response<ResponseBody> {
    error_response(StatusCode::UNAUTHORIZED, auth_error_code(err), err.to_string())
}

/// The error code reported for an authentication failure.
#[must_use]
pub fn auth_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingHeaders(_) => "MissingHeaders",
        AuthError::KeyNotFound(_) => "UnknownKeyId",
        AuthError::SignatureDoesNotMatch => "SignatureDoesNotMatch",
        AuthError::InvalidHeaderValue(_) => "InvalidHeaderValue",
    }
}

fn build(status: StatusCode, body: ResponseBody) -> http::Response<ResponseBody> {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response
}
