//! # Jupiter Broker SDK
//!
//! Trust and resilience layer for the Jupiter message broker client.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Credentials, slicer, entities, config, errors. No I/O
//! - **Ports Layer** (`ports/`): The executor, codec and delivery seams
//! - **Adapters** (`adapters/`): `reqwest` executor and JSON codec
//! - **Services**: `transport` (retrying HTTP client), `producer`, `gateway`
//!
//! ## Security Notes
//!
//! - Signatures are HMAC-SHA512 over `content ‖ timestamp`, checked in constant time
//! - Secrets are zeroized on drop and never appear in `Debug` output or logs
//! - Slicer reassembly re-hashes every chunk before trusting it

pub mod adapters;
pub mod domain;
pub mod gateway;
pub mod ports;
pub mod producer;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export public API
pub use adapters::{JsonCodec, ReqwestExecutor};
pub use domain::config::{api_host, RetryPolicy, TransportConfig, API_BASE_URL, SDK_VERSION};
pub use domain::credentials::{Credentials, SignatureParts, VerifyOptions};
pub use domain::entities::{
    Block, Driver, Header, HttpHeaders, HttpMethod, Message, MessagePreflightResponse,
    ProduceResponse, PublishOptions, PublishOutcome, SplitMode, SplitOptions,
};
pub use domain::errors::{BrokerError, BrokerResult, ErrorKind};
pub use domain::slicer::{join, Chunk, Slicer};
pub use gateway::{api, ApiGateway, Jupiter, MessageBroker};
pub use ports::outbound::{Codec, HttpExecutor, MessageDelivery, OutboundRequest, RawResponse};
pub use producer::{Producer, HEADER_BLOCKS_COUNT, HEADER_MESSAGE_SIGNATURE};
pub use transport::{HttpClient, RequestInit, RequestOptions};
