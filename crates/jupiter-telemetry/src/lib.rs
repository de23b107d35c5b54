//! # Jupiter Telemetry
//!
//! Structured logging for applications using the Jupiter broker SDK. The SDK
//! itself only emits `tracing` events; this crate installs a subscriber that
//! renders them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jupiter_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("valid log filter");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `JUPITER_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `JUPITER_JSON_LOGS` | `false` | Emit JSON lines |
//! | `OTEL_SERVICE_NAME` | `jupiter-broker-sdk` | Service name in the startup event |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_LOG_LEVEL, DEFAULT_SERVICE_NAME};
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter `{directive}`: {reason}")]
    Filter { directive: String, reason: String },
}
