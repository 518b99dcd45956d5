//! # Signature Engine
//!
//! Deterministic hashes a contract would verify, signed with a deployment's
//! admin key:
//!
//! - **Whitelist**: `keccak(node, whitelist, nonce, sigType, chainId)`
//! - **Minipool deposit**: `keccak(minipool, keccak(salt, node), factory,
//!   nonce, sigType, chainId)`
//!
//! Nonces are per (deployment, address, operation) and only move through the
//! explicit increment calls.

pub mod encoding;
mod engine;

pub use encoding::{deposit_hash, whitelist_hash, DepositSubject, SIGNATURE_TYPE};
pub use engine::{
    increment_deposit_nonce, increment_whitelist_nonce, minipool_deposit_signature,
    whitelist_signature,
};
