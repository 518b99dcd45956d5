//! Node registration.

use crate::domain::{MessageTemplates, MockError};
use crate::ports::outbound::SignatureVerifier;
use crate::store::Database;
use ns_crypto::{Address, RecoverableSignature};

/// Flip a whitelisted node to registered after checking its signature over
/// the registration message.
///
/// Check order: whitelisting, signature, prior registration.
pub fn register<V: SignatureVerifier + ?Sized>(
    db: &mut Database,
    verifier: &V,
    templates: &MessageTemplates,
    email: &str,
    address: Address,
    signature: &RecoverableSignature,
) -> Result<(), MockError> {
    let node = db.whitelisted_node(&address)?;
    if node.owner != email {
        return Err(MockError::AddressMissingWhitelist(address));
    }

    let message = templates.register_message(email, &address);
    let recovered = verifier.recover_signer(message.as_bytes(), signature)?;
    if recovered != address {
        return Err(MockError::SignatureMismatch {
            expected: address,
            actual: recovered,
        });
    }

    let node = db.whitelisted_node_mut(&address)?;
    if node.registered {
        return Err(MockError::AlreadyRegistered(address));
    }
    node.registered = true;
    Ok(())
}
