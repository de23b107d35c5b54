//! # Domain Entities
//!
//! Plain data shared by the credentials, transport and producer layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Header name to value. Ordered so header sets are deterministic.
pub type HttpHeaders = BTreeMap<String, String>;

/// HTTP verbs used by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Broker messages
// =============================================================================

/// A key/value message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A message as stored by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub partition: u32,
    pub partitioned: bool,
    pub offset: u64,
    pub timestamp: u64,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub headers: Vec<Header>,
}

/// Acknowledgement of an un-split publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub timestamp: u64,
}

/// Server answer to a split-message preflight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePreflightResponse {
    pub message_id: String,
    pub transporter_key: String,
    pub blocks_count: u32,
    pub target: String,
    pub timestamp: u64,
}

/// One block of a split message, ready for delivery.
///
/// `index` is sequential here (0, 1, 2, ...), unlike slicer chunk offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: usize,
    pub value: String,
    pub hash: String,
    pub last: bool,
}

// =============================================================================
// Publish options
// =============================================================================

/// Delivery driver. Only `VirtualHttp` is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Driver {
    Socketbus,
    #[default]
    VirtualHttp,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socketbus => f.write_str("socketbus"),
            Self::VirtualHttp => f.write_str("virtual-http"),
        }
    }
}

/// How split blocks are meant to be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Serial,
}

/// Message splitting parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitOptions {
    /// Largest block, in characters of the encrypted text
    pub max_block_size: usize,
    /// Upper bound on the number of blocks, if any
    #[serde(default)]
    pub max_blocks: Option<usize>,
    #[serde(default)]
    pub mode: SplitMode,
}

impl SplitOptions {
    pub fn new(max_block_size: usize) -> Self {
        Self {
            max_block_size,
            max_blocks: None,
            mode: SplitMode::Serial,
        }
    }
}

/// Options for [`crate::Producer::publish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    pub partition: Option<u32>,
    pub driver: Driver,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub key: Option<String>,
    /// Present means "split this message"
    pub split: Option<SplitOptions>,
}

impl PublishOptions {
    /// Options that request splitting.
    pub fn split(split: SplitOptions) -> Self {
        Self {
            split: Some(split),
            ..Self::default()
        }
    }
}

/// Result of a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Un-split message handed to the delivery collaborator.
    Delivered(ProduceResponse),
    /// Split message: preflight accepted, blocks ready for transfer.
    Preflight {
        response: MessagePreflightResponse,
        blocks: Vec<Block>,
    },
}
