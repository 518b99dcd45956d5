//! # Sealed Payloads (X25519 + XChaCha20-Poly1305)
//!
//! Hybrid public-key encryption for the exit-message relay. A sender only
//! needs the recipient's 32-byte X25519 key; every payload uses a fresh
//! ephemeral key pair.
//!
//! Wire layout: `ephemeral_pub (32) || nonce (24) || ciphertext || tag (16)`
//!
//! The payload key is `keccak256(tag || shared_secret || ephemeral_pub || recipient_pub)`.

use crate::address::{decode_hex, encode_hex};
use crate::hashing::keccak256_many;
use crate::symmetric::{self, Nonce, SecretKey, NONCE_LENGTH, TAG_LENGTH};
use crate::CryptoError;
use rand::RngCore;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// Domain separation tag for the payload key derivation.
const KDF_DOMAIN_TAG: &[u8] = b"ns-mock/exit-relay/v1";

/// X25519 public key length.
pub const RECIPIENT_KEY_LENGTH: usize = 32;

/// Smallest well-formed sealed payload (empty plaintext).
pub const MIN_SEALED_LENGTH: usize = RECIPIENT_KEY_LENGTH + NONCE_LENGTH + TAG_LENGTH;

/// Public half of a relay identity; anyone holding it can seal payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayRecipient([u8; RECIPIENT_KEY_LENGTH]);

impl RelayRecipient {
    /// Create from raw key bytes.
    pub fn from_bytes(bytes: [u8; RECIPIENT_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded recipient key.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        let bytes = decode_hex(input).map_err(|_| CryptoError::InvalidPublicKey)?;
        let array: [u8; RECIPIENT_KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: RECIPIENT_KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; RECIPIENT_KEY_LENGTH] {
        &self.0
    }

    /// `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    /// Seal `plaintext` so only the matching identity can open it.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut ephemeral_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ephemeral_bytes);
        let ephemeral_secret = StaticSecret::from(ephemeral_bytes);
        ephemeral_bytes.zeroize();
        let ephemeral_public = PublicKey::from(&ephemeral_secret);

        let shared = ephemeral_secret.diffie_hellman(&PublicKey::from(self.0));
        if !shared.was_contributory() {
            return Err(CryptoError::InvalidPublicKey);
        }

        let key = derive_payload_key(shared.as_bytes(), ephemeral_public.as_bytes(), &self.0);
        let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext)?;

        let mut sealed = Vec::with_capacity(MIN_SEALED_LENGTH + plaintext.len());
        sealed.extend_from_slice(ephemeral_public.as_bytes());
        sealed.extend_from_slice(nonce.as_bytes());
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }
}

/// Static X25519 identity able to open sealed payloads.
#[derive(Clone)]
pub struct RelayIdentity {
    secret: StaticSecret,
}

impl RelayIdentity {
    /// Generate a random identity.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let identity = Self::from_bytes(bytes);
        bytes.zeroize();
        identity
    }

    /// Create from 32 secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            secret: StaticSecret::from(bytes),
        }
    }

    /// Secret bytes (for test fixtures that persist an identity).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Public half handed to clients.
    pub fn recipient(&self) -> RelayRecipient {
        RelayRecipient(*PublicKey::from(&self.secret).as_bytes())
    }

    /// Open a payload produced by [`RelayRecipient::seal`].
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < MIN_SEALED_LENGTH {
            return Err(CryptoError::InvalidCiphertext(format!(
                "sealed payload is {} bytes, need at least {}",
                sealed.len(),
                MIN_SEALED_LENGTH
            )));
        }

        let (ephemeral, rest) = sealed.split_at(RECIPIENT_KEY_LENGTH);
        let (nonce, ciphertext) = rest.split_at(NONCE_LENGTH);

        let mut ephemeral_bytes = [0u8; RECIPIENT_KEY_LENGTH];
        ephemeral_bytes.copy_from_slice(ephemeral);

        let shared = self.secret.diffie_hellman(&PublicKey::from(ephemeral_bytes));
        if !shared.was_contributory() {
            return Err(CryptoError::InvalidCiphertext(
                "non-contributory ephemeral key".to_string(),
            ));
        }

        let key = derive_payload_key(shared.as_bytes(), &ephemeral_bytes, self.recipient().as_bytes());
        symmetric::decrypt(&key, ciphertext, &Nonce::from_slice(nonce)?)
    }
}

impl std::fmt::Debug for RelayIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayIdentity")
            .field("recipient", &self.recipient().to_hex())
            .finish_non_exhaustive()
    }
}

impl PartialEq for RelayIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.recipient() == other.recipient()
    }
}

impl Eq for RelayIdentity {}

fn derive_payload_key(shared: &[u8; 32], ephemeral: &[u8; 32], recipient: &[u8; 32]) -> SecretKey {
    SecretKey::from_bytes(keccak256_many(&[
        KDF_DOMAIN_TAG,
        shared.as_slice(),
        ephemeral.as_slice(),
        recipient.as_slice(),
    ]))
}
