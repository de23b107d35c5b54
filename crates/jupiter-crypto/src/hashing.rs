//! # SHA-512 Hashing
//!
//! Every digest in the SDK is SHA-512 rendered as lowercase hex. Chunk hashes,
//! Merkle nodes and whole-message checksums all depend on that single choice,
//! so there is deliberately no algorithm parameter.

use sha2::{Digest, Sha512};

/// SHA-512 output (512-bit).
pub type Hash = [u8; 64];

/// Length of a hex-encoded SHA-512 digest.
pub const SHA512_HEX_LEN: usize = 128;

/// Stateful SHA-512 hasher.
pub struct Sha512Hasher {
    inner: Sha512,
}

impl Sha512Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha512::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.inner.update(data.as_ref());
        self
    }

    /// Finalize and return the raw digest.
    pub fn finalize(self) -> Hash {
        to_hash(&self.inner.finalize())
    }

    /// Finalize and return the hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.finalize())
    }
}

impl Default for Sha512Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with SHA-512 (one-shot).
pub fn sha512(data: impl AsRef<[u8]>) -> Hash {
    to_hash(&Sha512::digest(data.as_ref()))
}

/// Hash data with SHA-512 and hex-encode the result.
pub fn sha512_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(sha512(data))
}

fn to_hash(digest: &[u8]) -> Hash {
    let mut out = [0u8; 64];
    out.copy_from_slice(digest);
    out
}
