//! # Credentials
//!
//! Holds the API key, bearer token and optional signing secret, produces the
//! authentication headers, and signs/verifies content.
//!
//! ## Signature wire format
//!
//! ```text
//! t=<unix-ms>,s=<hex hmac-sha512(secret, content ‖ t)>,i=<8-hex instance id>
//! ```
//!
//! Field order is fixed, there is no whitespace, and the MAC covers the
//! timestamp exactly as written in the `t` field.
//!
//! ## Security Notes
//!
//! - The secret is decoded once and zeroized on drop; `secret()` hands out a copy
//! - Verification compares MACs in constant time
//! - Malformed signatures verify as `false`, they never error

use crate::domain::config::SIGNATURE_WINDOW_MS;
use crate::domain::entities::HttpHeaders;
use crate::domain::errors::{BrokerError, BrokerResult};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use jupiter_crypto::{hmac_sha512_hex, verify_hmac_sha512};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;
use zeroize::Zeroizing;

pub const HEADER_API_KEY: &str = "X-Jupiter-Api-Key";
pub const HEADER_REQUEST_TS: &str = "X-Jupiter-Request-TS";
pub const HEADER_CREDENTIALS_ID: &str = "X-Jupiter-Credentials-Id";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Length of the credential instance id.
pub const INSTANCE_ID_LEN: usize = 8;

/// Standard alphabet, padding optional.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Options for [`Credentials::verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Reference "now" in unix milliseconds; defaults to the wall clock
    pub timestamp: Option<u64>,
    /// Allowed drift in milliseconds; defaults to 5 minutes
    pub timeout: Option<u64>,
}

/// Parsed form of a signature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    /// Timestamp exactly as it appears on the wire
    pub timestamp: String,
    /// Hex MAC
    pub mac: String,
    /// Signing credential instance id
    pub instance_id: String,
}

impl SignatureParts {
    /// Structural parse. Returns `None` for anything that is not exactly
    /// `t=<digits>,s=<lowercase hex>,i=<8 lowercase hex>`.
    pub fn parse(signature: &str) -> Option<Self> {
        let mut fields = signature.split(',');
        let (t, s, i) = (fields.next()?, fields.next()?, fields.next()?);
        if fields.next().is_some() {
            return None;
        }

        let timestamp = t.strip_prefix("t=")?;
        let mac = s.strip_prefix("s=")?;
        let instance_id = i.strip_prefix("i=")?;

        if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if mac.is_empty() || !is_lower_hex(mac) {
            return None;
        }
        if instance_id.len() != INSTANCE_ID_LEN || !is_lower_hex(instance_id) {
            return None;
        }

        Some(Self {
            timestamp: timestamp.to_string(),
            mac: mac.to_string(),
            instance_id: instance_id.to_string(),
        })
    }

    /// Timestamp as a number; `None` if it does not fit in a `u64`.
    pub fn timestamp_ms(&self) -> Option<u64> {
        self.timestamp.parse().ok()
    }
}

impl fmt::Display for SignatureParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={},s={},i={}", self.timestamp, self.mac, self.instance_id)
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Current unix time in milliseconds (0 if the clock is before the epoch).
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(INSTANCE_ID_LEN);
    id
}

/// API credentials for one client instance.
///
/// Immutable after construction. Safe to share behind an `Arc` and use from
/// many tasks at once.
pub struct Credentials {
    instance_id: String,
    api_key: String,
    token: String,
    secret: Option<Zeroizing<Vec<u8>>>,
}

impl Credentials {
    /// Build credentials.
    ///
    /// `secret` is the base64 text of the signing key. `None` or an empty
    /// string means "no secret": headers still work, signing does not.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty api key or token, or a secret that is
    /// not valid base64.
    pub fn new(
        api_key: impl Into<String>,
        token: impl Into<String>,
        secret: Option<&str>,
    ) -> BrokerResult<Self> {
        let api_key = api_key.into();
        let token = token.into();

        if api_key.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "apiKey must be a non-empty string".into(),
            ));
        }
        if token.is_empty() {
            return Err(BrokerError::InvalidArgument(
                "apiToken must be a non-empty string".into(),
            ));
        }

        let secret = match secret {
            Some(encoded) if !encoded.is_empty() => {
                let bytes = SECRET_ENGINE.decode(encoded.trim()).map_err(|e| {
                    BrokerError::InvalidArgument(format!("secret must be base64: {e}"))
                })?;
                Some(Zeroizing::new(bytes))
            }
            _ => None,
        };

        Ok(Self {
            instance_id: short_id(),
            api_key,
            token,
            secret,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// A fresh copy of the decoded secret. Mutating it does not affect `self`.
    pub fn secret(&self) -> Option<Zeroizing<Vec<u8>>> {
        self.secret.as_ref().map(|s| Zeroizing::new(s.to_vec()))
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Identifier correlating signatures to this instance. Not a secret.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Authentication and content negotiation headers for one request.
    pub fn headers(&self) -> HttpHeaders {
        let mut headers = HttpHeaders::new();
        headers.insert("Connection".into(), "close".into());
        headers.insert(
            "Accept".into(),
            "application/json, text/plain, application/octet-stream".into(),
        );
        headers.insert("Accept-Encoding".into(), "gzip, deflate".into());
        headers.insert(HEADER_API_KEY.into(), self.api_key.clone());
        headers.insert(HEADER_REQUEST_TS.into(), now_ms().to_string());
        headers.insert(HEADER_CREDENTIALS_ID.into(), self.instance_id.clone());
        headers.insert(HEADER_AUTHORIZATION.into(), format!("Bearer {}", self.token));
        headers
    }

    /// Sign `content` at the current time.
    ///
    /// # Errors
    ///
    /// `MissingSecret` when no secret was configured.
    pub fn sign(&self, content: impl AsRef<[u8]>) -> BrokerResult<String> {
        self.sign_at(content.as_ref(), now_ms())
    }

    pub(crate) fn sign_at(&self, content: &[u8], timestamp_ms: u64) -> BrokerResult<String> {
        let secret = self.secret.as_ref().ok_or(BrokerError::MissingSecret {
            operation: "sign content",
        })?;

        let ts = timestamp_ms.to_string();
        let mac = hmac_sha512_hex(secret, &[content, ts.as_bytes()]);

        Ok(SignatureParts {
            timestamp: ts,
            mac,
            instance_id: self.instance_id.clone(),
        }
        .to_string())
    }

    /// Check a signature over `content`.
    ///
    /// Returns `Ok(false)` for malformed, stale or non-matching signatures.
    /// A stale signature is one whose `|now - t|` exceeds the window; a drift
    /// exactly equal to the window is still accepted.
    ///
    /// # Errors
    ///
    /// `MissingSecret` when no secret was configured.
    pub fn verify(
        &self,
        content: impl AsRef<[u8]>,
        signature: &str,
        options: VerifyOptions,
    ) -> BrokerResult<bool> {
        let secret = self.secret.as_ref().ok_or(BrokerError::MissingSecret {
            operation: "verify content",
        })?;

        let Some(parts) = SignatureParts::parse(signature) else {
            return Ok(false);
        };
        let Some(signed_at) = parts.timestamp_ms() else {
            return Ok(false);
        };

        let now = options.timestamp.unwrap_or_else(now_ms);
        let window = options.timeout.unwrap_or(SIGNATURE_WINDOW_MS);
        if now.abs_diff(signed_at) > window {
            return Ok(false);
        }

        let Ok(expected) = hex::decode(&parts.mac) else {
            return Ok(false);
        };

        Ok(verify_hmac_sha512(
            secret,
            &[content.as_ref(), parts.timestamp.as_bytes()],
            &expected,
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("instance_id", &self.instance_id)
            .field("api_key", &self.api_key)
            .field("token", &"<redacted>")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
