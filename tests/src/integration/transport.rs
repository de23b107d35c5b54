//! # Transport Flows
//!
//! `HttpClient` against a real socket: headers on the wire, retry counts,
//! timeouts and error bodies.

#[cfg(test)]
mod tests {
    use super::super::{init_test_logging, TEST_SECRET};
    use jupiter_broker::{
        BrokerError, Credentials, HttpClient, RequestOptions, RetryPolicy, TransportConfig,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Retries without real backoff waits.
    const FAST_RETRY: RetryPolicy = RetryPolicy {
        retries: 3,
        base_delay_ms: 1,
    };

    fn client(server: &MockServer) -> HttpClient {
        let credentials = Arc::new(Credentials::new("ak", "tok", Some(TEST_SECRET)).unwrap());
        let config = TransportConfig::new(format!("{}/ignored/base/path/", server.uri()))
            .with_default_header("Accept-Language", "en-US")
            .with_retry(FAST_RETRY);
        HttpClient::new(config, credentials).unwrap()
    }

    #[tokio::test]
    async fn test_headers_and_body_on_the_wire() {
        init_test_logging();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/exposed/v1/echo"))
            .and(header("X-Jupiter-Api-Key", "ak"))
            .and(header("Authorization", "Bearer tok"))
            .and(header("Accept-Language", "en-US"))
            .and(header("Content-Type", "application/json; charset=UTF-8"))
            .and(header("User-Agent", HttpClient::user_agent().as_str()))
            .and(header_exists("X-Jupiter-Request-TS"))
            .and(header_exists("X-Jupiter-Credentials-Id"))
            .and(body_json(json!({"hello": "world"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let value: Value = client(&server)
            .post(
                &["/api", "exposed", "v1", "echo"],
                &json!({"hello": "world"}),
                RequestOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "busy"})))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .expect(1)
            .mount(&server)
            .await;

        let value: Vec<u32> = client(&server)
            .get(&["flaky"], RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(value, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_last_remote_error() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/queues/q-1"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"errors": [{"message": "queue is not empty"}]})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server)
            .delete::<Value>(&["queues", "q-1"], RequestOptions::default().with_retries(2))
            .await
            .unwrap_err();

        match err {
            BrokerError::DeliveryFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(
                    *source,
                    BrokerError::RemoteError {
                        status: 409,
                        message: "queue is not empty".into(),
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let options = RequestOptions::default().with_timeout(Duration::from_millis(200));
        let err = client(&server)
            .get::<Value>(&["slow"], options)
            .await
            .unwrap_err();

        assert_eq!(err, BrokerError::Timeout { timeout_ms: 200 });
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_null() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/topics/orders"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let value: Value = client(&server)
            .patch(&["topics", "orders"], &json!({"retention": 3600}), RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_unmatched_route_exhausts_attempts() {
        let server = MockServer::start().await;

        let credentials = Arc::new(Credentials::new("ak", "tok", None).unwrap());
        let config = TransportConfig::new(server.uri()).with_retry(RetryPolicy {
            retries: 1,
            base_delay_ms: 1,
        });
        let client = HttpClient::new(config, credentials).unwrap();

        let err = client
            .get::<Value>(&["anything"], RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BrokerError::DeliveryFailed { attempts: 2, .. }));
        assert_eq!(err.status(), Some(404));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
