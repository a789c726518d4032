//! Error statuses and retry behavior over a real connection.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use h3_client::{AttemptError, Client, ClientError, RequestContext};
    use h3_core::H3Config;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_return_not_found_without_retry() {
        let server = TestServer::start().await;
        let client = server.client();

        let err = client
            .get::<serde_json::Value>(&RequestContext::new(), "/status/404", &HashMap::new())
            .await
            .unwrap_err();

        assert!(err.is_not_found(), "unexpected error: {err}");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_exhaust_retries_on_server_error() {
        let server = TestServer::start().await;
        let client = Client::new(server.config().with_max_retries(2)).unwrap();

        let err = client
            .get::<serde_json::Value>(&RequestContext::new(), "/status/503", &HashMap::new())
            .await
            .unwrap_err();

        match err {
            ClientError::RetriesExhausted {
                retries,
                last_error: AttemptError::Server { status, .. },
            } => {
                assert_eq!(retries, 2);
                assert_eq!(status, 503);
            }
            other => panic!("expected exhausted retries, got {other}"),
        }

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_retry_connection_failures() {
        let server = TestServer::start().await;
        let base_url = server.base_url();
        server.shutdown().await;

        let client = Client::new(
            H3Config::new(base_url, "AK1", "secret")
                .with_max_retries(1)
                .with_backoff_base(Duration::from_millis(5)),
        )
        .unwrap();

        let err = client
            .delete(&RequestContext::new(), "/v1/vms/abc")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClientError::RetriesExhausted {
                retries: 1,
                last_error: AttemptError::Transport(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_should_stop_at_deadline() {
        let server = TestServer::start().await;
        let client = Client::new(
            server
                .config()
                .with_max_retries(10)
                .with_backoff_base(Duration::from_secs(1)),
        )
        .unwrap();

        let ctx = RequestContext::new().timeout(Duration::from_millis(200));
        let err = client
            .get::<serde_json::Value>(&ctx, "/status/500", &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::DeadlineExceeded));

        server.shutdown().await;
    }
}
