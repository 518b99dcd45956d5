//! # Keccak-256 Hashing
//!
//! The hash used by every contract-facing digest and by the personal-message
//! signing convention.

use sha3::{Digest, Keccak256};

/// Keccak-256 output (256-bit).
pub type Hash = [u8; 32];

/// Prefix of the personal-message (EIP-191 version 0x45) signing convention.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Stateful Keccak-256 hasher.
pub struct Keccak256Hasher {
    inner: Keccak256,
}

impl Keccak256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
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

impl Default for Keccak256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of multiple inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}

/// Digest of `message` under the personal-message convention:
/// `keccak256("\x19Ethereum Signed Message:\n" ++ len(message) ++ message)`.
pub fn personal_message_hash(message: &[u8]) -> Hash {
    let length = message.len().to_string();
    keccak256_many(&[
        PERSONAL_MESSAGE_PREFIX.as_bytes(),
        length.as_bytes(),
        message,
    ])
}
