//! # HMAC-SHA512
//!
//! Message authentication for request signatures. The message is passed as a
//! list of parts that are fed to the MAC in order, which is equivalent to
//! MACing their concatenation without allocating it.
//!
//! ## Security Properties
//!
//! - HMAC accepts keys of any length, so construction never fails
//! - Verification compares in constant time

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

fn keyed(key: &[u8], parts: &[&[u8]]) -> HmacSha512 {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take key of any size");

    for part in parts {
        mac.update(part);
    }

    mac
}

/// Compute HMAC-SHA512 over the concatenation of `parts`, hex-encoded.
pub fn hmac_sha512_hex(key: &[u8], parts: &[&[u8]]) -> String {
    hex::encode(keyed(key, parts).finalize().into_bytes())
}

/// Check `expected` (raw MAC bytes) against HMAC-SHA512 of `parts`.
///
/// The comparison is constant-time. A wrong-length `expected` is simply
/// rejected.
pub fn verify_hmac_sha512(key: &[u8], parts: &[&[u8]], expected: &[u8]) -> bool {
    keyed(key, parts).verify_slice(expected).is_ok()
}
