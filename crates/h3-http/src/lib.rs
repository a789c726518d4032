//! HTTP service layer that authenticates H3 requests.
//!
//! [`service::VerifyingService`] implements hyper's `Service` trait. For every
//! request it buffers the body, verifies the HMAC signature through a
//! [`h3_auth::CredentialProvider`], and only then hands the request to a
//! [`handler::RequestHandler`]. Requests that fail verification never reach
//! the handler and are answered with `401`.

pub mod body;
pub mod echo;
pub mod handler;
pub mod response;
pub mod server;
pub mod service;

pub use body::ResponseBody;
pub use echo::EchoHandler;
pub use handler::{AuthenticatedRequest, RequestHandler};
pub use server::serve;
pub use service::{VerifyingHttpConfig, VerifyingService};
