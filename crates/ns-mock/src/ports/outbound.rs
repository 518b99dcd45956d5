//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the mock needs from the outside: signer recovery.

use crate::domain::MockError;
use ns_crypto::{recover_personal_signer, Address, CryptoError, RecoverableSignature};

/// Recovers the address that signed a personal message.
///
/// Implementations accept recovery bytes in {0, 1} or {27, 28}.
pub trait SignatureVerifier: Send + Sync {
    /// Recover the signer of `message`.
    ///
    /// # Errors
    /// * `MockError::MalformedInput` - recovery byte out of range or bad length
    /// * `MockError::InvalidSignature` - well-formed but unrecoverable
    fn recover_signer(
        &self,
        message: &[u8],
        signature: &RecoverableSignature,
    ) -> Result<Address, MockError>;
}

/// Default verifier: secp256k1 public-key recovery over the Ethereum
/// personal-message hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcrecoverVerifier;

impl SignatureVerifier for EcrecoverVerifier {
    fn recover_signer(
        &self,
        message: &[u8],
        signature: &RecoverableSignature,
    ) -> Result<Address, MockError> {
        recover_personal_signer(message, signature).map_err(|e| match e {
            CryptoError::RecoveryFailed | CryptoError::InvalidSignature => {
                MockError::InvalidSignature
            }
            other => MockError::from(other),
        })
    }
}
