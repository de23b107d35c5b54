//! # Symmetric Encryption
//!
//! AES-256-CBC with PKCS#7 padding. The wire form is `IV(16) ‖ ciphertext`;
//! the text form is that buffer in standard base64.
//!
//! CBC carries no authentication tag. Integrity of split payloads comes from
//! the request signature and the per-chunk hashes, not from the cipher.

use crate::CryptoError;
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// CBC initialisation vector length in bytes.
pub const IV_LEN: usize = 16;

/// Secret key (256-bit).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Encrypt plaintext with AES-256-CBC under a fresh random IV.
///
/// Returns `IV ‖ ciphertext`.
pub fn encrypt_cbc(key: &SecretKey, plaintext: &[u8]) -> Vec<u8> {
    let mut iv = [0u8; IV_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut iv);

    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt `IV ‖ ciphertext` produced by [`encrypt_cbc`].
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` for truncated input, a ciphertext
/// that is not block-aligned, or bad padding (which is what a wrong key
/// usually looks like).
pub fn decrypt_cbc(key: &SecretKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < IV_LEN {
        return Err(CryptoError::DecryptionFailed(format!(
            "input shorter than IV ({} bytes)",
            data.len()
        )));
    }

    let (iv, ciphertext) = data.split_at(IV_LEN);
    let mut iv_block = [0u8; IV_LEN];
    iv_block.copy_from_slice(iv);

    Aes256CbcDec::new(key.as_bytes().into(), &iv_block.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Encrypt and render as standard base64 text.
pub fn encrypt_cbc_base64(key: &SecretKey, plaintext: &[u8]) -> String {
    STANDARD.encode(encrypt_cbc(key, plaintext))
}

/// Decode standard base64 text and decrypt it.
pub fn decrypt_cbc_base64(key: &SecretKey, text: &str) -> Result<Vec<u8>, CryptoError> {
    let data = STANDARD
        .decode(text)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    decrypt_cbc(key, &data)
}
