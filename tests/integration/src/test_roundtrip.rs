//! Signed requests that the server accepts.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use h3_client::RequestContext;
    use http::Method;
    use serde::Deserialize;

    use crate::{KEY_ID, TestServer};

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Echo {
        key_id: String,
        method: String,
        path: String,
        query: String,
        body_sha256: String,
    }

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[tokio::test]
    async fn test_should_get_with_valid_signature() {
        let server = TestServer::start().await;
        let client = server.client();

        let echo: Echo = client
            .get(&RequestContext::new(), "/v1/vms", &HashMap::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(echo.key_id, KEY_ID);
        assert_eq!(echo.method, "GET");
        assert_eq!(echo.path, "/v1/vms");
        assert_eq!(echo.query, "");
        assert_eq!(echo.body_sha256, EMPTY_SHA256);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_send_sorted_encoded_query() {
        let server = TestServer::start().await;
        let client = server.client();

        let query = HashMap::from([
            ("zone".to_owned(), "eu-1".to_owned()),
            ("name".to_owned(), "web server".to_owned()),
            ("limit".to_owned(), "10".to_owned()),
        ]);
        let echo: Echo = client
            .get(&RequestContext::new(), "/v1/vms", &query)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(echo.query, "limit=10&name=web%20server&zone=eu-1");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_post_json_body() {
        let server = TestServer::start().await;
        let client = server.client();

        let body = serde_json::json!({ "name": "vm-1" });
        let echo: Echo = client
            .post(&RequestContext::new(), "/v1/vms", &body)
            .await
            .unwrap()
            .unwrap();

        let expected = h3_auth::hash_payload(&serde_json::to_vec(&body).unwrap());
        assert_eq!(echo.method, "POST");
        assert_eq!(echo.body_sha256, expected);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_decode_into_sink() {
        let server = TestServer::start().await;
        let client = server.client();

        let mut echo = Echo {
            key_id: String::new(),
            method: String::new(),
            path: String::new(),
            query: String::new(),
            body_sha256: String::new(),
        };
        client
            .execute_into(
                &RequestContext::new(),
                Method::PUT,
                "/v1/vms/abc",
                &HashMap::new(),
                Some(&serde_json::json!({ "cpus": 2 })),
                Some(&mut echo),
            )
            .await
            .unwrap();

        assert_eq!(echo.method, "PUT");
        assert_eq!(echo.path, "/v1/vms/abc");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_delete_without_body() {
        let server = TestServer::start().await;
        let client = server.client();

        client
            .delete(&RequestContext::new(), "/v1/vms/abc")
            .await
            .unwrap();

        server.shutdown().await;
    }
}
