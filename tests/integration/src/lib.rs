//! End-to-end tests: the real client talking to the real verifying server.
//!
//! Each test starts its own server on an ephemeral port, so nothing needs to
//! be running beforehand:
//! ```text
//! cargo test -p h3-integration
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;

use h3_auth::StaticCredentialProvider;
use h3_client::Client;
use h3_core::H3Config;
use h3_http::{EchoHandler, VerifyingHttpConfig, VerifyingService};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Key id accepted by the test server.
pub const KEY_ID: &str = "AK-integration";

/// Secret for [`KEY_ID`].
pub const SECRET_KEY: &str = "integration-secret";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A running echo server that stops when dropped or shut down.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server on an ephemeral port.
    pub async fn start() -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no local addr");

        let service = VerifyingService::new(
            Arc::new(EchoHandler),
            VerifyingHttpConfig {
                credential_provider: Arc::new(StaticCredentialProvider::new(vec![(
                    KEY_ID.to_owned(),
                    SECRET_KEY.to_owned(),
                )])),
            },
        );

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(h3_http::serve(listener, service, async {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration for a client with the accepted credentials and fast
    /// retries.
    #[must_use]
    pub fn config(&self) -> H3Config {
        H3Config::new(self.base_url(), KEY_ID, SECRET_KEY)
            .with_timeout(Duration::from_secs(5))
            .with_backoff_base(Duration::from_millis(10))
    }

    /// A client signing with the accepted credentials.
    #[must_use]
    pub fn client(&self) -> Client {
        Client::new(self.config()).expect("failed to build client")
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.await.ok();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

mod test_auth;
mod test_errors;
mod test_roundtrip;
