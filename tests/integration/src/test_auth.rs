//! Requests the server must reject.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use h3_client::{Client, RequestContext};
    use h3_core::H3Config;

    use crate::{KEY_ID, TestServer};

    #[tokio::test]
    async fn test_should_reject_wrong_secret() {
        let server = TestServer::start().await;
        let client =
            Client::new(H3Config::new(server.base_url(), KEY_ID, "not-the-secret")).unwrap();

        let err = client
            .get::<serde_json::Value>(&RequestContext::new(), "/v1/vms", &HashMap::new())
            .await
            .unwrap_err();

        assert!(err.is_unauthorized(), "unexpected error: {err}");
        assert_eq!(err.status_code(), Some(401));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_unknown_key_id() {
        let server = TestServer::start().await;
        let client =
            Client::new(H3Config::new(server.base_url(), "AK-unknown", "secret")).unwrap();

        let err = client
            .delete(&RequestContext::new(), "/v1/vms/abc")
            .await
            .unwrap_err();

        let h3_client::ClientError::Http(http_err) = err else {
            panic!("expected an HTTP error");
        };
        assert_eq!(http_err.status_code, 401);
        assert!(http_err.body.contains("UnknownKeyId"), "body: {}", http_err.body);

        server.shutdown().await;
    }
}
