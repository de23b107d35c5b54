//! # Slicer
//!
//! Splits a string into fixed-size chunks, hashes each chunk, builds a
//! Merkle tree over the chunk hashes, and reassembles chunks with full
//! re-verification.
//!
//! ## Chunk indices
//!
//! A chunk's `index` is its character offset in the source (0, n, 2n, ...),
//! not its position. [`join`] orders by that field and tolerates gaps, so a
//! partial chunk set reassembles to the concatenation of what is present.
//! Pass the whole-source checksum to `join` to turn gaps into errors.
//!
//! ## Hashing
//!
//! SHA-512, lowercase hex, everywhere. Merkle parents hash the *string*
//! concatenation of the two child hex digests; an odd node pairs with `""`.

use crate::domain::config::{DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::domain::errors::{BrokerError, BrokerResult};
use jupiter_crypto::{sha512_hex, Sha512Hasher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One addressable slice of a larger payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Character offset of this chunk in the source
    pub index: usize,
    pub value: String,
    /// Hex SHA-512 of `value`
    pub hash: String,
}

impl Chunk {
    /// Build a chunk, hashing `value`.
    pub fn new(index: usize, value: impl Into<String>) -> Self {
        let value = value.into();
        let hash = sha512_hex(&value);
        Self { index, value, hash }
    }

    /// Whether `hash` still matches `value`.
    pub fn is_intact(&self) -> bool {
        sha512_hex(&self.value) == self.hash
    }
}

/// One-shot chunker over a single source string.
#[derive(Debug, Clone)]
pub struct Slicer {
    original: String,
    chunk_size: usize,
    chunks: Vec<Chunk>,
    digest: Option<String>,
}

impl Slicer {
    /// Create a slicer; `chunk_size` counts characters and must be at least 2.
    pub fn new(value: impl Into<String>, chunk_size: usize) -> BrokerResult<Self> {
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(BrokerError::InvalidArgument(format!(
                "Chunk size must be at least {MIN_CHUNK_SIZE}, got {chunk_size}"
            )));
        }

        Ok(Self {
            original: value.into(),
            chunk_size,
            chunks: Vec::new(),
            digest: None,
        })
    }

    /// Create a slicer with the default chunk size.
    pub fn with_default_chunk_size(value: impl Into<String>) -> Self {
        Self {
            original: value.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunks: Vec::new(),
            digest: None,
        }
    }

    /// Reassemble chunks; see [`join`].
    pub fn join(chunks: &[Chunk], original_checksum: Option<&str>) -> BrokerResult<String> {
        join(chunks, original_checksum)
    }

    /// Split the source. Allowed exactly once.
    pub fn slice(&mut self) -> BrokerResult<&[Chunk]> {
        if self.digest.is_some() {
            return Err(BrokerError::AlreadySliced);
        }

        self.digest = Some(sha512_hex(&self.original));

        let mut offset = 0;
        let mut window = String::new();
        let mut window_len = 0;

        for c in self.original.chars() {
            window.push(c);
            window_len += 1;

            if window_len == self.chunk_size {
                self.chunks.push(Chunk::new(offset, std::mem::take(&mut window)));
                offset += window_len;
                window_len = 0;
            }
        }

        if window_len > 0 {
            self.chunks.push(Chunk::new(offset, window));
        }

        tracing::trace!(
            chunk_size = self.chunk_size,
            chunks = self.chunks.len(),
            "Sliced content"
        );

        Ok(&self.chunks)
    }

    /// Every level of the Merkle tree, leaves first, root level last.
    ///
    /// Leaf hashes are recomputed from chunk values rather than copied from
    /// the stored `hash` fields.
    pub fn merkle_levels(&self) -> BrokerResult<Vec<Vec<String>>> {
        if self.chunks.is_empty() {
            return Err(BrokerError::NotSliced);
        }

        let mut level: Vec<String> = self.chunks.iter().map(|c| sha512_hex(&c.value)).collect();
        let mut levels = Vec::new();

        while level.len() > 1 {
            let parent = level
                .chunks(2)
                .map(|pair| {
                    let mut hasher = Sha512Hasher::new();
                    hasher.update(&pair[0]);
                    if let Some(right) = pair.get(1) {
                        hasher.update(right);
                    }
                    hasher.finalize_hex()
                })
                .collect();

            levels.push(std::mem::replace(&mut level, parent));
        }

        levels.push(level);
        Ok(levels)
    }

    /// Final Merkle level; a single root in every non-empty case.
    pub fn create_merkle_tree(&self) -> BrokerResult<Vec<String>> {
        let mut levels = self.merkle_levels()?;
        Ok(levels.pop().unwrap_or_default())
    }

    /// The Merkle root.
    pub fn merkle_root(&self) -> BrokerResult<String> {
        self.create_merkle_tree()?
            .into_iter()
            .next()
            .ok_or(BrokerError::NotSliced)
    }

    /// Whole-source digest, available after slicing.
    pub fn digest(&self) -> BrokerResult<&str> {
        self.digest.as_deref().ok_or(BrokerError::NotSliced)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_sliced(&self) -> bool {
        self.digest.is_some()
    }
}

/// Reassemble a source string from an unordered chunk collection.
///
/// Chunks are concatenated in ascending `index` order. Missing indices are
/// skipped. When two chunks share an index the first one wins. Every chunk
/// is re-hashed and must match its recorded hash; if `original_checksum` is
/// given the reassembled string must hash to it as well.
///
/// # Errors
///
/// `IntegrityViolation` carrying the expected and actual digests.
pub fn join(chunks: &[Chunk], original_checksum: Option<&str>) -> BrokerResult<String> {
    let mut ordered: BTreeMap<usize, &Chunk> = BTreeMap::new();
    for chunk in chunks {
        ordered.entry(chunk.index).or_insert(chunk);
    }

    let mut original = String::with_capacity(ordered.values().map(|c| c.value.len()).sum());

    for chunk in ordered.values() {
        let actual = sha512_hex(&chunk.value);
        if actual != chunk.hash {
            return Err(BrokerError::integrity(
                format!("Failed to verify the integrity of chunk {}", chunk.index),
                chunk.hash.clone(),
                actual,
            ));
        }

        original.push_str(&chunk.value);
    }

    let Some(expected) = original_checksum.filter(|c| !c.is_empty()) else {
        return Ok(original);
    };

    let actual = sha512_hex(&original);
    if actual != expected {
        return Err(BrokerError::integrity(
            "Failed to verify the integrity of the original string",
            expected,
            actual,
        ));
    }

    Ok(original)
}
