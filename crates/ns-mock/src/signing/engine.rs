//! Signature issuance and replay-protection counters.

use super::encoding::{deposit_hash, whitelist_hash, DepositSubject};
use crate::domain::invariants::{check_exit_messages, check_minipool_limit};
use crate::domain::{Deployment, IssuedSignature, MockError};
use crate::store::Database;
use ns_crypto::{Address, Hash, RecoverableSignature};
use primitive_types::U256;

/// Sign `hash` with the deployment's admin key under the personal-message
/// convention.
fn sign_for(deployment: &Deployment, hash: &Hash) -> Result<RecoverableSignature, MockError> {
    let key = deployment.admin_key.as_ref().ok_or_else(|| {
        tracing::error!(
            deployment = %deployment.name,
            "Signature requested before the admin private key was set"
        );
        MockError::MissingPrivateKey(deployment.name.clone())
    })?;
    Ok(key.keypair().sign_personal_message(hash)?)
}

/// Whitelist signature for `node`. The nonce is read, never advanced.
pub fn whitelist_signature(
    db: &Database,
    deployment: &str,
    node: &Address,
) -> Result<IssuedSignature, MockError> {
    let deployment = db.deployment(deployment)?;
    db.registered_node(node)?;

    let nonce = deployment.whitelist_nonce(node);
    let hash = whitelist_hash(node, &deployment.whitelist_address, nonce, deployment.chain_id);
    Ok(IssuedSignature {
        signature: sign_for(deployment, &hash)?,
        nonce,
        chain_id: deployment.chain_id,
        contract: deployment.whitelist_address,
    })
}

/// Minipool-deposit signature for `node`.
///
/// Gated on the owning user's minipool cap and on every minipool the node
/// already owns carrying an exit message.
pub fn minipool_deposit_signature(
    db: &Database,
    deployment: &str,
    node: &Address,
    minipool: Address,
    salt: U256,
) -> Result<IssuedSignature, MockError> {
    let deployment = db.deployment(deployment)?;
    let owner = &db.registered_node(node)?.owner;

    let owned_by_user = db
        .user(owner)
        .map(|user| {
            user.nodes
                .iter()
                .map(|address| deployment.constellation_validators_of(address).count())
                .sum::<usize>()
        })
        .unwrap_or(0);
    check_minipool_limit(owner, owned_by_user, deployment.minipool_limit)?;
    check_exit_messages(deployment.constellation_validators_of(node))?;

    let nonce = deployment.deposit_nonce(node);
    let hash = deposit_hash(&DepositSubject {
        minipool,
        salt,
        node: *node,
        factory: deployment.factory_address,
        nonce,
        chain_id: deployment.chain_id,
    });
    Ok(IssuedSignature {
        signature: sign_for(deployment, &hash)?,
        nonce,
        chain_id: deployment.chain_id,
        contract: deployment.factory_address,
    })
}

/// Advance the whitelist counter of `address`; returns the new value.
pub fn increment_whitelist_nonce(
    db: &mut Database,
    deployment: &str,
    address: Address,
) -> Result<u64, MockError> {
    let counter = db
        .deployment_mut(deployment)?
        .whitelist_nonces
        .entry(address)
        .or_insert(0);
    *counter += 1;
    Ok(*counter)
}

/// Advance the deposit counter of `address`; returns the new value.
pub fn increment_deposit_nonce(
    db: &mut Database,
    deployment: &str,
    address: Address,
) -> Result<u64, MockError> {
    let counter = db
        .deployment_mut(deployment)?
        .deposit_nonces
        .entry(address)
        .or_insert(0);
    *counter += 1;
    Ok(*counter)
}
