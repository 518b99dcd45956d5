//! # NS Crypto - Cryptographic Primitives for the Service Mock
//!
//! Everything the mock needs to speak the same cryptography as the real
//! service and the contracts that trust it.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Message digests, personal-message hashing |
//! | `address` | EIP-55 | Address parsing and checksummed rendering |
//! | `ecdsa` | secp256k1 | Recoverable signing, signer recovery |
//! | `symmetric` | XChaCha20-Poly1305 | AEAD for sealed payloads |
//! | `sealed` | X25519 + XChaCha20-Poly1305 | Exit-message relay encryption |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S signatures
//! - **Recovery ids**: accepted as {0,1} or {27,28}, always emitted as {27,28}
//! - **X25519**: ephemeral sender keys, non-contributory shared secrets rejected

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod sealed;
pub mod symmetric;

// Re-exports
pub use address::{decode_hex, encode_hex, parse_address, to_checksum_address, Address};
pub use ecdsa::{
    normalize_recovery_id, recover_address, recover_personal_signer, RecoverableSignature,
    Secp256k1KeyPair, SIGNATURE_LENGTH,
};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, personal_message_hash, Hash, Keccak256Hasher};
pub use sealed::{RelayIdentity, RelayRecipient};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
