//! # Producer Flows
//!
//! Gateway -> message broker -> producer -> preflight, against a mock broker.

#[cfg(test)]
mod tests {
    use super::super::{init_test_logging, test_key_bytes, TEST_SECRET};
    use jupiter_broker::{
        api, ApiGateway, Block, BrokerError, Credentials, HttpClient, MessageBroker, Producer,
        PublishOptions, PublishOutcome, RetryPolicy, SplitOptions, TransportConfig, VerifyOptions,
        HEADER_BLOCKS_COUNT, HEADER_MESSAGE_SIGNATURE,
    };
    use jupiter_crypto::{decrypt_cbc_base64, SecretKey};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PREFLIGHT_PATH: &str = "/api/exposed/v1/queues/topics/orders/messages/preflight";

    fn preflight_body(blocks: u32) -> Value {
        json!({
            "messageId": "msg-7",
            "transporterKey": "tk-7",
            "blocksCount": blocks,
            "target": "orders",
            "timestamp": 1_700_000_000_000u64
        })
    }

    fn credentials() -> Arc<Credentials> {
        Arc::new(Credentials::new("ak", "tok", Some(TEST_SECRET)).unwrap())
    }

    fn decrypt(blocks: &[Block]) -> String {
        let ciphertext: String = blocks.iter().map(|b| b.value.as_str()).collect();
        let key = SecretKey::from_bytes(test_key_bytes());
        String::from_utf8(decrypt_cbc_base64(&key, &ciphertext).unwrap()).unwrap()
    }

    fn header_value(request: &wiremock::Request, name: &str) -> String {
        request.headers.get(name).unwrap().to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_single_block_preflight() {
        init_test_logging();
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(PREFLIGHT_PATH))
            .and(header(HEADER_BLOCKS_COUNT, "1"))
            .and(header_exists(HEADER_MESSAGE_SIGNATURE))
            .and(header("Accept-Language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(preflight_body(1)))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = credentials();
        let producer = Producer::from_url(server.uri(), credentials.clone()).unwrap();
        let message = json!({"order": 42, "total": "19.99"});

        let outcome = producer
            .publish("orders", &message, Some(PublishOptions::split(SplitOptions::new(10_000))))
            .await
            .unwrap();

        let PublishOutcome::Preflight { response, blocks } = outcome else {
            panic!("expected a preflight outcome");
        };
        assert_eq!(response.message_id, "msg-7");
        assert_eq!(response.blocks_count, 1);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].last);

        let encoded = serde_json::to_string(&message).unwrap();
        assert_eq!(decrypt(&blocks), encoded);

        let requests = server.received_requests().await.unwrap();
        let signature = header_value(&requests[0], HEADER_MESSAGE_SIGNATURE);
        assert_eq!(signature, blocks[0].hash);
        assert!(credentials
            .verify(&encoded, &signature, VerifyOptions::default())
            .unwrap());

        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["timestamp"].is_u64());
    }

    #[tokio::test]
    async fn test_gateway_broker_multi_block_preflight() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(PREFLIGHT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(preflight_body(0)))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = api("ak", "tok", Some(TEST_SECRET)).unwrap();
        let broker = MessageBroker::with_base_url(gateway.credentials().clone(), &server.uri())
            .unwrap();

        let message = json!({"lines": (0..40).map(|i| format!("line {i}")).collect::<Vec<_>>()});
        let outcome = broker
            .producer()
            .publish("orders", &message, Some(PublishOptions::split(SplitOptions::new(48))))
            .await
            .unwrap();

        let PublishOutcome::Preflight { blocks, .. } = outcome else {
            panic!("expected a preflight outcome");
        };
        assert!(blocks.len() > 1);
        assert_eq!(blocks.iter().filter(|b| b.last).count(), 1);
        assert!(blocks.last().unwrap().last);
        assert_eq!(decrypt(&blocks), serde_json::to_string(&message).unwrap());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            header_value(&requests[0], HEADER_BLOCKS_COUNT),
            blocks.len().to_string()
        );
    }

    #[tokio::test]
    async fn test_preflight_rejection_surfaces_remote_message() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(PREFLIGHT_PATH))
            .respond_with(
                ResponseTemplate::new(413).set_body_json(json!({"reason": "too many blocks"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let config = TransportConfig::new(server.uri()).with_retry(RetryPolicy {
            retries: 1,
            base_delay_ms: 1,
        });
        let client = HttpClient::new(config, credentials()).unwrap();
        let producer = Producer::from_client(Arc::new(client));

        let err = producer
            .publish("orders", &json!({}), Some(PublishOptions::split(SplitOptions::new(64))))
            .await
            .unwrap_err();

        assert!(matches!(err, BrokerError::DeliveryFailed { attempts: 2, .. }));
        assert_eq!(err.status(), Some(413));
        assert!(err.to_string().contains("too many blocks"));
    }

    #[tokio::test]
    async fn test_broker_without_secret_is_rejected() {
        let gateway = api("ak", "tok", None).unwrap();
        let err = gateway.message_broker().unwrap_err();
        assert!(matches!(err, BrokerError::InvalidArgument(_)));
    }
}
