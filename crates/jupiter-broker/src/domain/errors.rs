//! # Broker Errors
//!
//! One error enum for the whole SDK. Construction and state-machine misuse
//! fail fast; the transport absorbs transient failures and only surfaces
//! `Timeout` or `DeliveryFailed`.

use jupiter_crypto::CryptoError;
use thiserror::Error;

/// Result alias used across the crate.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Coarse classification of a [`BrokerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    MissingSecret,
    AlreadySliced,
    NotSliced,
    IntegrityViolation,
    RemoteError,
    Timeout,
    DeliveryFailed,
    Network,
    Decode,
    Crypto,
    Unsupported,
}

/// Errors produced by credentials, the slicer, the transport and the producer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    /// Bad constructor or call input. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs a secret that was not configured.
    #[error("Cannot {operation} without a secret key")]
    MissingSecret { operation: &'static str },

    /// `slice()` was called a second time.
    #[error("Content can only be sliced once")]
    AlreadySliced,

    /// An operation that needs slicing ran before it.
    #[error("Content must be sliced first")]
    NotSliced,

    /// A recomputed digest did not match the recorded one.
    #[error("{context}: expected {expected}, got {actual}")]
    IntegrityViolation {
        context: String,
        expected: String,
        actual: String,
    },

    /// The remote answered with a non-2xx status.
    #[error("Remote error (status {status}): {message}")]
    RemoteError { status: u16, message: String },

    /// An attempt exceeded its time budget. Not retried.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// All attempts failed; wraps the last failure.
    #[error("Delivery failed after {attempts} attempt(s): {source}")]
    DeliveryFailed {
        attempts: u32,
        #[source]
        source: Box<BrokerError>,
    },

    /// The HTTP executor could not complete the exchange.
    #[error("Network error: {0}")]
    Network(String),

    /// A body could not be encoded or decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Only the `virtual-http` driver is supported.
    #[error("Unsupported driver `{0}`: only `virtual-http` is supported")]
    UnsupportedDriver(String),

    /// Un-split publishing needs a delivery collaborator and none is installed.
    #[error("No delivery collaborator installed for un-split messages")]
    DeliveryUnavailable,
}

impl BrokerError {
    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::MissingSecret { .. } => ErrorKind::MissingSecret,
            Self::AlreadySliced => ErrorKind::AlreadySliced,
            Self::NotSliced => ErrorKind::NotSliced,
            Self::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            Self::RemoteError { .. } => ErrorKind::RemoteError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::DeliveryFailed { .. } => ErrorKind::DeliveryFailed,
            Self::Network(_) => ErrorKind::Network,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::UnsupportedDriver(_) | Self::DeliveryUnavailable => ErrorKind::Unsupported,
        }
    }

    /// Whether the transport retry loop may try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteError { .. } | Self::Network(_) | Self::Decode(_)
        )
    }

    /// HTTP status for remote errors, including one wrapped by `DeliveryFailed`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError { status, .. } => Some(*status),
            Self::DeliveryFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    pub(crate) fn integrity(
        context: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::IntegrityViolation {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
