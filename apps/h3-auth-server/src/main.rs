//! H3 Auth Server - echo server behind HMAC signature verification.
//!
//! Every request except `GET /health` must carry a valid H3 HMAC signature.
//! Authenticated requests are echoed back as JSON, and `/status/<code>`
//! answers with the requested status.
//!
//! # Usage
//!
//! ```text
//! H3_KEY_ID=AK1 H3_SECRET_KEY=secret h3-auth-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `H3_LISTEN` | `127.0.0.1:4001` | Bind address |
//! | `H3_KEY_ID` | *(required)* | Accepted key id |
//! | `H3_SECRET_KEY` | *(required)* | Secret for that key id |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use h3_auth::StaticCredentialProvider;
use h3_http::{EchoHandler, VerifyingHttpConfig, VerifyingService};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "127.0.0.1:4001";

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `log_level`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Parse the listen address, falling back to the default when unset or blank.
fn parse_listen_addr(raw: Option<&str>) -> Result<SocketAddr> {
    let addr = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_LISTEN);
    addr.parse()
        .with_context(|| format!("invalid listen address: {addr}"))
}

/// Build the credential provider from a key id and secret.
fn build_credential_provider(
    key_id: Option<String>,
    secret_key: Option<String>,
) -> Result<StaticCredentialProvider> {
    let key_id = key_id
        .filter(|s| !s.is_empty())
        .context("H3_KEY_ID must be set")?;
    let secret_key = secret_key
        .filter(|s| !s.is_empty())
        .context("H3_SECRET_KEY must be set")?;

    info!(key_id = %key_id, "configured credential provider from environment");

    Ok(StaticCredentialProvider::new(vec![(key_id, secret_key)]))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal, draining connections");
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level)?;

    let addr = parse_listen_addr(std::env::var("H3_LISTEN").ok().as_deref())?;
    let provider = build_credential_provider(
        std::env::var("H3_KEY_ID").ok(),
        std::env::var("H3_SECRET_KEY").ok(),
    )?;

    let service = VerifyingService::new(
        Arc::new(EchoHandler),
        VerifyingHttpConfig {
            credential_provider: Arc::new(provider),
        },
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        version = env!("CARGO_PKG_VERSION"),
        "h3 auth server ready"
    );

    h3_http::serve(listener, service, shutdown_signal()).await;

    Ok(())
}
