//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures in the 65-byte `r || s || v` layout used by
//! wallets and contracts.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (same key + digest = same signature)
//! - Low-S signatures on the signing side
//! - Recovery ids accepted as {0,1} or {27,28}, emitted as {27,28}
//!
//! ## Use Cases
//!
//! - Login and registration challenges signed by node wallets
//! - Whitelist and minipool-deposit authorizations signed by a deployment admin

use crate::address::{decode_hex, encode_hex, Address};
use crate::hashing::{keccak256, personal_message_hash, Hash};
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

/// Length of a recoverable signature (`r || s || v`).
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the raw recovery id in the canonical encoding.
const RECOVERY_ID_OFFSET: u8 = 27;

/// Map a recovery byte into the canonical {27, 28} range.
///
/// Signatures arrive from different tooling in either form; anything else is
/// malformed.
pub fn normalize_recovery_id(v: u8) -> Result<u8, CryptoError> {
    match v {
        0 | 1 => Ok(v + RECOVERY_ID_OFFSET),
        27 | 28 => Ok(v),
        _ => Err(CryptoError::InvalidRecoveryId(v)),
    }
}

/// Recoverable ECDSA signature (65 bytes, `r || s || v`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Create from a byte slice, checking the length only.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; SIGNATURE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Parse from hex (with or without `0x`).
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        Self::from_slice(&decode_hex(input)?)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The recovery byte as received.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Copy with the recovery byte moved into {27, 28}.
    pub fn normalized(&self) -> Result<Self, CryptoError> {
        let mut bytes = self.0;
        bytes[64] = normalize_recovery_id(self.v())?;
        Ok(Self(bytes))
    }

    /// `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex-encoded secret key.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let mut bytes = decode_hex(input)?;
        let secret: Result<[u8; 32], _> = bytes.as_slice().try_into();
        bytes.zeroize();
        let secret = secret.map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_bytes(secret)
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest directly.
    pub fn sign_prehash(&self, digest: &Hash) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte() + RECOVERY_ID_OFFSET;
        Ok(RecoverableSignature(bytes))
    }

    /// Sign `message` under the personal-message convention.
    pub fn sign_personal_message(
        &self,
        message: &[u8],
    ) -> Result<RecoverableSignature, CryptoError> {
        self.sign_prehash(&personal_message_hash(message))
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl Clone for Secp256k1KeyPair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &encode_hex(&self.address()))
            .finish_non_exhaustive()
    }
}

/// Derive the address of a public key.
pub fn address_from_verifying_key(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);

    // Keccak256 of the public key without the 0x04 prefix
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recover the signer address of a 32-byte digest.
pub fn recover_address(
    digest: &Hash,
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let normalized = signature.normalized()?;
    let recovery_id = RecoveryId::from_byte(normalized.v() - RECOVERY_ID_OFFSET)
        .ok_or(CryptoError::InvalidRecoveryId(signature.v()))?;

    let sig = Signature::from_slice(&normalized.as_bytes()[..64])
        .map_err(|_| CryptoError::InvalidSignature)?;

    let recovered = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&recovered))
}

/// Recover the signer of a personal message.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    recover_address(&personal_message_hash(message), signature)
}
