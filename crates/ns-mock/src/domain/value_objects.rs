//! # Value Objects
//!
//! Small immutable types shared by every component: validator keys, the
//! StakeWise status machine, and the per-generation policies chosen when the
//! mock is constructed.

use ns_crypto::{to_checksum_address, Address, CryptoError, Secp256k1KeyPair};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::fmt;

/// BLS public key length.
pub const VALIDATOR_PUBKEY_LENGTH: usize = 48;

/// Validator (BLS) public key. Opaque bytes; the mock never does BLS math.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatorPubkey(#[serde_as(as = "Hex")] [u8; VALIDATOR_PUBKEY_LENGTH]);

impl ValidatorPubkey {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; VALIDATOR_PUBKEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from hex (with or without `0x`).
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let bytes = ns_crypto::decode_hex(input)?;
        let array: [u8; VALIDATOR_PUBKEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: VALIDATOR_PUBKEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; VALIDATOR_PUBKEY_LENGTH] {
        &self.0
    }
}

impl fmt::Display for ValidatorPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ValidatorPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorPubkey({self})")
    }
}

/// A deployment's signing key.
///
/// Equality compares the derived address so stores holding keys stay
/// comparable without exposing secret bytes.
#[derive(Clone, Debug)]
pub struct AdminKey(Secp256k1KeyPair);

impl AdminKey {
    /// Load from 32 secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        Ok(Self(Secp256k1KeyPair::from_bytes(bytes)?))
    }

    /// Load from hex (with or without `0x`).
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        Ok(Self(Secp256k1KeyPair::from_hex(input)?))
    }

    /// Signer address.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Underlying key pair.
    pub fn keypair(&self) -> &Secp256k1KeyPair {
        &self.0
    }
}

impl From<Secp256k1KeyPair> for AdminKey {
    fn from(keypair: Secp256k1KeyPair) -> Self {
        Self(keypair)
    }
}

impl PartialEq for AdminKey {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for AdminKey {}

// =============================================================================
// STAKEWISE STATUS
// =============================================================================

/// StakeWise validator status.
///
/// ```text
/// UNKNOWN -> PENDING -> UPLOADED -> REGISTERED
///    \          \           \            \
///     +----------+-----------+------------+--> REMOVED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidatorStatus {
    /// Never seen by the vault
    #[default]
    Unknown,
    /// Deposit data received and stored
    Pending,
    /// Included in a committed deposit-data set
    Uploaded,
    /// Confirmed active
    Registered,
    /// Exit confirmed; terminal
    Removed,
}

impl ValidatorStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ValidatorStatus) -> bool {
        use ValidatorStatus::*;
        matches!(
            (self, next),
            (Unknown, Pending)
                | (Pending, Uploaded)
                | (Uploaded, Registered)
                | (Unknown | Pending | Uploaded | Registered, Removed)
        )
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        self == ValidatorStatus::Removed
    }
}

// =============================================================================
// GENERATION POLICIES
// =============================================================================

/// What to do when a second exit message arrives for the same validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMessagePolicy {
    /// Replace the stored message (older API shape)
    Overwrite,
    /// Fail with `ExitMessageAlreadyExists` (newer API shape)
    RejectDuplicate,
}

/// Whether a login nonce may be verified more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NonceReusePolicy {
    /// A verified nonce can log in again and yields the same token
    #[default]
    Reusable,
    /// A verified nonce is consumed
    SingleUse,
}

/// Message bodies that nodes sign for login and registration.
///
/// Placeholders: `{nonce}`, `{address}`, `{email}`. Addresses are rendered in
/// EIP-55 checksum form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    /// Login challenge body
    pub login: String,
    /// Node registration body
    pub register: String,
}

impl MessageTemplates {
    /// Render the login challenge for `nonce` and `address`.
    pub fn login_message(&self, nonce: &str, address: &Address) -> String {
        self.login
            .replace("{nonce}", nonce)
            .replace("{address}", &to_checksum_address(address))
    }

    /// Render the registration message for `email` and `address`.
    pub fn register_message(&self, email: &str, address: &Address) -> String {
        self.register
            .replace("{email}", email)
            .replace("{address}", &to_checksum_address(address))
    }
}

/// API generation the mock emulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Older shape: exit messages overwrite
    V2,
    /// Current shape: duplicate exit messages conflict
    #[default]
    V3,
}

impl ApiGeneration {
    /// Exit-message policy of this generation.
    pub fn exit_message_policy(self) -> ExitMessagePolicy {
        match self {
            ApiGeneration::V2 => ExitMessagePolicy::Overwrite,
            ApiGeneration::V3 => ExitMessagePolicy::RejectDuplicate,
        }
    }

    /// Message templates of this generation.
    pub fn templates(self) -> MessageTemplates {
        let login = "nonce: {nonce}\naddress: {address}".to_string();
        let register = match self {
            ApiGeneration::V2 => "{email}:{address}",
            ApiGeneration::V3 => "email: {email}\nnode: {address}",
        };
        MessageTemplates {
            login,
            register: register.to_string(),
        }
    }

    /// Parse `v2` / `v3` (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "v2" | "2" => Some(ApiGeneration::V2),
            "v3" | "3" => Some(ApiGeneration::V3),
            _ => None,
        }
    }
}
