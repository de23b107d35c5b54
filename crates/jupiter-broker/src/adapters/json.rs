//! JSON body codec.

use crate::domain::errors::{BrokerError, BrokerResult};
use crate::ports::outbound::Codec;
use serde_json::Value;
use tracing::debug;

/// `Content-Type` sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// JSON [`Codec`]. With `debug` set, every value passing through is traced.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    debug: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec that traces payloads at `debug` level.
    ///
    /// Payloads may be sensitive; keep this off outside development.
    pub fn with_debug(debug: bool) -> Self {
        Self { debug }
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    fn encode(&self, value: &Value) -> BrokerResult<String> {
        if self.debug {
            debug!(%value, "Encoding data");
        }

        serde_json::to_string(value).map_err(|e| BrokerError::Decode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> BrokerResult<Value> {
        if self.debug {
            debug!(data = %String::from_utf8_lossy(bytes), "Decoding data");
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(bytes).map_err(|e| BrokerError::Decode(e.to_string()))
    }
}
