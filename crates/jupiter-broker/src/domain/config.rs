//! Transport configuration and SDK-wide constants.

use crate::domain::entities::HttpHeaders;
use crate::domain::errors::{BrokerError, BrokerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SDK version reported in the user agent.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Public API endpoint of the Jupiter workspace.
pub const API_BASE_URL: &str = "https://api.jupiterworkspace.com/api/exposed/v1";

/// Default signature freshness window (5 minutes).
pub const SIGNATURE_WINDOW_MS: u64 = 5 * 60 * 1000;

/// Default chunk size, in characters, for the slicer.
pub const DEFAULT_CHUNK_SIZE: usize = 96;

/// Smallest chunk size the slicer accepts.
pub const MIN_CHUNK_SIZE: usize = 2;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 3;

/// Backoff base: attempt `n` (n >= 1) waits `base * 2^n`.
pub const BACKOFF_BASE_MS: u64 = 250;

/// Retry policy for the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (3 means up to 4 tries)
    pub retries: u32,
    /// Backoff base in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base_delay_ms: BACKOFF_BASE_MS,
        }
    }
}

impl RetryPolicy {
    /// Delay before `attempt` (zero-based). The first attempt never waits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        // Shift capped so a silly retry count cannot overflow.
        let factor = 1u64 << attempt.min(20);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Absolute base URL; a trailing slash is stripped.
    pub base_url: String,
    /// Headers sent with every request, lowest precedence
    pub default_headers: HttpHeaders,
    /// Default per-attempt timeout; `None` or `0` means untimed
    pub default_timeout_ms: Option<u64>,
    /// Retry policy
    pub retry: RetryPolicy,
    /// Trace request and response payloads at `debug` level
    pub debug_payloads: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: api_host().to_string(),
            default_headers: HttpHeaders::new(),
            default_timeout_ms: None,
            retry: RetryPolicy::default(),
            debug_payloads: false,
        }
    }
}

impl TransportConfig {
    /// Config for `base_url` with everything else defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builder-style default header.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Builder-style default timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Builder-style retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style payload tracing. Payloads may be sensitive.
    pub fn with_debug_payloads(mut self, enabled: bool) -> Self {
        self.debug_payloads = enabled;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> BrokerResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(BrokerError::InvalidArgument("baseUrl is required".into()));
        }

        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| BrokerError::InvalidArgument(format!("invalid baseUrl: {e}")))?;

        if url.cannot_be_a_base() {
            return Err(BrokerError::InvalidArgument(format!(
                "baseUrl must be an absolute URL: {}",
                self.base_url
            )));
        }

        Ok(())
    }

    /// Default timeout, only if positive.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Host part of [`API_BASE_URL`], i.e. everything before `/api/`.
pub fn api_host() -> &'static str {
    API_BASE_URL
        .split("/api/")
        .next()
        .unwrap_or(API_BASE_URL)
        .trim()
}
