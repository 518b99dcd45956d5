//! Challenge/response login.

use crate::domain::{MessageTemplates, MockError, NonceReusePolicy};
use crate::ports::outbound::SignatureVerifier;
use crate::store::Database;
use ns_crypto::{Address, RecoverableSignature};

/// Verify a signed login challenge and bind its session to `address`.
///
/// Returns the token minted alongside `nonce`.
pub fn login<V: SignatureVerifier + ?Sized>(
    db: &mut Database,
    verifier: &V,
    templates: &MessageTemplates,
    policy: NonceReusePolicy,
    address: Address,
    nonce: &str,
    signature: &RecoverableSignature,
) -> Result<String, MockError> {
    let message = templates.login_message(nonce, &address);
    let recovered = verifier.recover_signer(message.as_bytes(), signature)?;
    if recovered != address {
        return Err(MockError::InvalidSignature);
    }

    let node_registered = db.node(&address).map(|n| n.registered).unwrap_or(false);

    let session = db
        .session_by_nonce_mut(nonce)
        .ok_or(MockError::InvalidNonce)?;
    if session.is_verified() && policy == NonceReusePolicy::SingleUse {
        return Err(MockError::InvalidNonce);
    }
    // A verified session stays bound to its first node.
    if session.node.is_some_and(|bound| bound != address) {
        return Err(MockError::InvalidNonce);
    }
    if !node_registered {
        return Err(MockError::UnregisteredNode(address));
    }

    session.verify(address);
    Ok(session.token.clone())
}
