//! Constellation minipools: ownership association and exit-message tracking.

use crate::domain::{
    ConstellationValidator, ConstellationValidatorInfo, EncryptedExitData, ExitMessage,
    ExitMessagePolicy, MockError, ValidatorPubkey,
};
use crate::relay::decrypt_exit_message;
use crate::store::Database;
use ns_crypto::Address;
use std::collections::BTreeSet;

/// Give `node` ownership of `pubkey` through `minipool`.
pub fn add_minipool(
    db: &mut Database,
    deployment: &str,
    node: &Address,
    minipool: Address,
    pubkey: ValidatorPubkey,
) -> Result<(), MockError> {
    db.whitelisted_node(node)?;
    let deployment = db.deployment_mut(deployment)?;
    if deployment.constellation.contains_key(&pubkey) {
        return Err(MockError::MinipoolAlreadyAssigned(pubkey));
    }
    deployment.constellation.insert(
        pubkey,
        ConstellationValidator {
            pubkey,
            node: *node,
            minipool,
            exit_message: None,
        },
    );
    Ok(())
}

/// Validators `node` owns in the deployment.
pub fn validators_of(
    db: &Database,
    deployment: &str,
    node: &Address,
) -> Result<Vec<ConstellationValidatorInfo>, MockError> {
    let deployment = db.deployment(deployment)?;
    db.registered_node(node)?;
    Ok(deployment
        .constellation_validators_of(node)
        .map(|v| ConstellationValidatorInfo {
            pubkey: v.pubkey,
            minipool: v.minipool,
            requires_exit_message: v.requires_exit_message(),
        })
        .collect())
}

/// Attach sealed exit messages to validators `node` owns.
///
/// Under [`ExitMessagePolicy::RejectDuplicate`] a validator that already has
/// a message (or appears twice in the batch) fails the whole upload.
pub fn upload_exits(
    db: &mut Database,
    deployment: &str,
    node: &Address,
    exits: &[EncryptedExitData],
    policy: ExitMessagePolicy,
) -> Result<usize, MockError> {
    db.registered_node(node)?;
    let target = db.deployment(deployment)?;

    let mut seen = BTreeSet::new();
    let mut opened: Vec<(ValidatorPubkey, ExitMessage)> = Vec::with_capacity(exits.len());
    for exit in exits {
        let validator = target
            .constellation
            .get(&exit.pubkey)
            .filter(|v| v.node == *node)
            .ok_or_else(|| {
                MockError::InvalidPermissions(format!(
                    "validator {} is not owned by this node",
                    exit.pubkey
                ))
            })?;
        let duplicate = !seen.insert(exit.pubkey) || validator.exit_message.is_some();
        if duplicate && policy == ExitMessagePolicy::RejectDuplicate {
            return Err(MockError::ExitMessageAlreadyExists(exit.pubkey));
        }
        let message = decrypt_exit_message(db.exit_identity(), &exit.encrypted_exit_message)?;
        opened.push((exit.pubkey, message));
    }

    let target = db.deployment_mut(deployment)?;
    for (pubkey, message) in opened.iter().cloned() {
        if let Some(validator) = target.constellation.get_mut(&pubkey) {
            validator.exit_message = Some(message);
        }
    }
    Ok(opened.len())
}
