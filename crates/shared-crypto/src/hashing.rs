//! # SHA-256 Hashing
//!
//! One-shot and streaming SHA-256, plus the Merkle root used for blocks of
//! revocations.

use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Stateful SHA-256 hasher.
#[derive(Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Merkle root over already-hashed leaves.
///
/// Empty input yields an empty root. A single leaf is paired with itself.
/// Otherwise the list splits so the left side is the largest power of two
/// strictly smaller than the input.
pub fn merkle_root(leaves: &[Hash]) -> Vec<u8> {
    match leaves {
        [] => Vec::new(),
        [only] => merkle_root(&[*only, *only]),
        [left, right] => {
            let mut hasher = Sha256Hasher::new();
            hasher.update(&sha256(left)).update(&sha256(right));
            hasher.finalize().to_vec()
        }
        _ => {
            let split = leaves.len().next_power_of_two() / 2;
            let (left, right) = leaves.split_at(split);
            let mut hasher = Sha256Hasher::new();
            hasher.update(&merkle_root(left)).update(&merkle_root(right));
            hasher.finalize().to_vec()
        }
    }
}
