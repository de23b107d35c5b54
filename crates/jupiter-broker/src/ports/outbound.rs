//! # Outbound Ports (Driven Ports / SPI)
//!
//! The I/O seams of the SDK: executing an HTTP exchange, turning values into
//! bytes, and delivering un-split messages.

use crate::domain::entities::{HttpHeaders, HttpMethod, ProduceResponse, PublishOptions};
use crate::domain::errors::BrokerResult;
use async_trait::async_trait;
use serde_json::Value;

/// A fully resolved request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Final header set, after precedence has been applied
    pub headers: HttpHeaders,
    pub body: Option<Vec<u8>>,
}

/// What came back from the wire, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx, or the status-less `0` some environments report.
    pub fn is_success(&self) -> bool {
        self.status == 0 || (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
///
/// Implementations report connection-level failures as
/// `BrokerError::Network`. Timeouts are applied by the caller, which drops
/// the returned future when the budget runs out.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> BrokerResult<RawResponse>;
}

/// Body encoding used by the transport and the producer.
pub trait Codec: Send + Sync {
    /// MIME type sent as `Content-Type`.
    fn content_type(&self) -> &'static str;

    /// # Errors
    /// `BrokerError::Decode` if the value cannot be represented.
    fn encode(&self, value: &Value) -> BrokerResult<String>;

    /// An empty input decodes to `Value::Null`.
    ///
    /// # Errors
    /// `BrokerError::Decode` on malformed input.
    fn decode(&self, bytes: &[u8]) -> BrokerResult<Value>;
}

/// Delivers a whole, un-split message to a topic.
///
/// The producer hands un-split payloads to whatever is installed here.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// # Arguments
    /// * `topic` - Destination topic
    /// * `encoded` - The message, already encoded by the producer's codec
    /// * `options` - Publish options as given by the caller
    async fn deliver(
        &self,
        topic: &str,
        encoded: &str,
        options: &PublishOptions,
    ) -> BrokerResult<ProduceResponse>;
}
