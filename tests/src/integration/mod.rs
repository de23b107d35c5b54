//! Integration flows.

pub mod producer;
pub mod signing;
pub mod transport;

use jupiter_telemetry::{init_logging, TelemetryConfig};

/// Install logging when `JUPITER_LOG_LEVEL` asks for it.
pub fn init_test_logging() {
    if std::env::var_os("JUPITER_LOG_LEVEL").is_some() {
        let _ = init_logging(&TelemetryConfig::from_env());
    }
}

/// A 32-byte AES key in the base64 form credentials expect.
pub const TEST_SECRET: &str = "AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=";

/// Raw bytes of [`TEST_SECRET`].
pub fn test_key_bytes() -> [u8; 32] {
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = i as u8 + 1;
    }
    key
}
