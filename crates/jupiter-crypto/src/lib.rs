//! # Jupiter Crypto - Primitive Contracts
//!
//! The broker SDK consumes cryptography only through the functions in this
//! crate. Nothing here knows about credentials, chunks or HTTP.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-512 (hex) | Chunk hashes, Merkle nodes, whole-message digests |
//! | `mac` | HMAC-SHA512 (hex) | Request signatures |
//! | `symmetric` | AES-256-CBC, PKCS#7 | Payload encryption before splitting |
//!
//! ## Security Properties
//!
//! - **HMAC verification**: constant-time comparison via `Mac::verify_slice`
//! - **Keys**: `SecretKey` is zeroized on drop
//! - **CBC**: a fresh random IV per message, prepended to the ciphertext

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod mac;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{sha512, sha512_hex, Sha512Hasher};
pub use mac::{hmac_sha512_hex, verify_hmac_sha512};
pub use symmetric::{decrypt_cbc, decrypt_cbc_base64, encrypt_cbc, encrypt_cbc_base64, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
