//! # Producer
//!
//! Publishes messages to broker topics.
//!
//! Un-split messages go to the installed [`MessageDelivery`] collaborator.
//! Split messages are signed, encrypted with the credentials' secret, cut
//! into blocks, and announced to the broker with a preflight request. The
//! blocks are returned for the caller to transfer.

use crate::adapters::JsonCodec;
use crate::domain::config::{TransportConfig, MIN_CHUNK_SIZE};
use crate::domain::credentials::{now_ms, Credentials};
use crate::domain::entities::{
    Block, Driver, MessagePreflightResponse, PublishOptions, PublishOutcome, SplitOptions,
};
use crate::domain::errors::{BrokerError, BrokerResult};
use crate::domain::slicer::Slicer;
use crate::ports::outbound::{Codec, MessageDelivery};
use crate::transport::{HttpClient, RequestOptions};
use jupiter_crypto::{encrypt_cbc_base64, SecretKey};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Number of blocks the broker should expect.
pub const HEADER_BLOCKS_COUNT: &str = "X-Jupiter-Queue-Message-Blocks-Count";

/// Signature over the encoded (unencrypted) message.
pub const HEADER_MESSAGE_SIGNATURE: &str = "X-Jupiter-Queue-Message-Signature";

/// Publishes messages through an [`HttpClient`].
pub struct Producer {
    client: Arc<HttpClient>,
    codec: JsonCodec,
    delivery: Option<Arc<dyn MessageDelivery>>,
}

impl Producer {
    /// Producer sharing an existing client.
    pub fn from_client(client: Arc<HttpClient>) -> Self {
        Self {
            codec: client.codec(),
            client,
            delivery: None,
        }
    }

    /// Producer with its own client for `url`, sending `Accept-Language: en-US`.
    pub fn from_url(url: impl Into<String>, credentials: Arc<Credentials>) -> BrokerResult<Self> {
        let config = TransportConfig::new(url).with_default_header("Accept-Language", "en-US");
        let client = HttpClient::new(config, credentials)?;
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Install the collaborator used for un-split messages.
    pub fn with_delivery(mut self, delivery: Arc<dyn MessageDelivery>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Publish `message` to `topic`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedDriver` for any driver but `virtual-http`
    /// - `MissingSecret` when the credentials carry no secret
    /// - `DeliveryUnavailable` for an un-split message with no collaborator
    /// - `InvalidArgument` when the split limits cannot be met
    /// - `Crypto` when the secret is not a valid AES-256 key
    /// - Any transport error from the preflight request
    pub async fn publish<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        message: &T,
        options: Option<PublishOptions>,
    ) -> BrokerResult<PublishOutcome> {
        if topic.is_empty() {
            return Err(BrokerError::InvalidArgument("topic must be a non-empty string".into()));
        }

        let options = options.unwrap_or_default();
        if options.driver != Driver::VirtualHttp {
            return Err(BrokerError::UnsupportedDriver(options.driver.to_string()));
        }

        let credentials = self.client.credentials();
        if !credentials.has_secret() {
            return Err(BrokerError::MissingSecret {
                operation: "publish a message",
            });
        }

        let value = serde_json::to_value(message).map_err(|e| BrokerError::Decode(e.to_string()))?;
        let encoded = self.codec.encode(&value)?;

        let Some(split) = options.split.as_ref() else {
            let delivery = self.delivery.as_ref().ok_or(BrokerError::DeliveryUnavailable)?;
            info!(topic, bytes = encoded.len(), "Delivering whole message");
            let response = delivery.deliver(topic, &encoded, &options).await?;
            return Ok(PublishOutcome::Delivered(response));
        };

        let signature = credentials.sign(&encoded)?;
        let blocks = self.seal(&encoded, &signature, split)?;

        info!(topic, blocks = blocks.len(), mode = ?split.mode, "Sending message preflight");

        let request_options = RequestOptions::default()
            .with_header(HEADER_BLOCKS_COUNT, blocks.len().to_string())
            .with_header(HEADER_MESSAGE_SIGNATURE, signature);

        let response: MessagePreflightResponse = self
            .client
            .put(
                &[
                    "api", "exposed", "v1", "queues", "topics", topic, "messages", "preflight",
                ],
                &json!({ "timestamp": now_ms() }),
                request_options,
            )
            .await?;

        Ok(PublishOutcome::Preflight { response, blocks })
    }

    /// Encrypt `encoded` and cut the ciphertext into blocks.
    fn seal(&self, encoded: &str, signature: &str, split: &SplitOptions) -> BrokerResult<Vec<Block>> {
        if split.max_block_size < MIN_CHUNK_SIZE {
            return Err(BrokerError::InvalidArgument(format!(
                "maxBlockSize must be at least {MIN_CHUNK_SIZE}, got {}",
                split.max_block_size
            )));
        }

        let secret = self.client.credentials().secret().ok_or(BrokerError::MissingSecret {
            operation: "encrypt a message",
        })?;
        let key = SecretKey::from_slice(&secret)?;
        let ciphertext = encrypt_cbc_base64(&key, encoded.as_bytes());

        let blocks = if ciphertext.len() <= split.max_block_size {
            vec![Block {
                index: 0,
                value: ciphertext,
                hash: signature.to_string(),
                last: true,
            }]
        } else {
            let mut slicer = Slicer::new(ciphertext, split.max_block_size)?;
            let chunks = slicer.slice()?;
            let count = chunks.len();

            chunks
                .iter()
                .enumerate()
                .map(|(i, chunk)| Block {
                    index: i,
                    value: chunk.value.clone(),
                    hash: chunk.hash.clone(),
                    last: i + 1 == count,
                })
                .collect()
        };

        if let Some(max) = split.max_blocks {
            if blocks.len() > max {
                return Err(BrokerError::InvalidArgument(format!(
                    "message needs {} blocks but maxBlocks is {max}",
                    blocks.len()
                )));
            }
        }

        Ok(blocks)
    }
}

impl std::fmt::Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("client", &self.client)
            .field("delivery", &self.delivery.is_some())
            .finish()
    }
}
