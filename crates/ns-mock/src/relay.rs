//! # Exit-Message Relay
//!
//! Exit messages travel sealed to the relay's X25519 identity: JSON body,
//! sealed with `ns_crypto::RelayRecipient::seal`, hex on the wire.

use crate::domain::{ExitMessage, MockError};
use ns_crypto::{decode_hex, RelayIdentity, RelayRecipient};

/// Seal `message` for the holder of `recipient_key` (32-byte hex).
pub fn encrypt_exit_message(message: &ExitMessage, recipient_key: &str) -> Result<String, MockError> {
    let recipient = RelayRecipient::from_hex(recipient_key)
        .map_err(|e| MockError::MalformedRecipientKey(e.to_string()))?;
    let plaintext =
        serde_json::to_vec(message).map_err(|e| MockError::MalformedInput(e.to_string()))?;
    let sealed = recipient
        .seal(&plaintext)
        .map_err(|e| MockError::MalformedRecipientKey(e.to_string()))?;
    Ok(hex::encode(sealed))
}

/// Open a sealed exit message with the configured identity.
pub fn decrypt_exit_message(
    identity: Option<&RelayIdentity>,
    ciphertext: &str,
) -> Result<ExitMessage, MockError> {
    let identity = identity.ok_or(MockError::IdentityNotConfigured)?;
    let sealed = decode_hex(ciphertext).map_err(|e| MockError::CorruptCiphertext(e.to_string()))?;
    let plaintext = identity
        .open(&sealed)
        .map_err(|e| MockError::CorruptCiphertext(e.to_string()))?;
    serde_json::from_slice(&plaintext).map_err(|e| MockError::CorruptCiphertext(e.to_string()))
}
