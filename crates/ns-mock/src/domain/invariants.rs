//! Lifecycle invariants checked before any mutation.

use super::entities::ConstellationValidator;
use super::errors::MockError;
use super::payloads::DepositData;
use super::value_objects::{ValidatorPubkey, ValidatorStatus};
use ns_crypto::Address;

/// Deposit records must withdraw to the vault they are uploaded to.
pub fn invariant_withdraws_to_vault(record: &DepositData, vault: &Address) -> bool {
    record.withdrawal_address() == *vault
}

/// Every record in a batch must withdraw to the vault; the first offender
/// rejects the whole batch.
pub fn check_deposit_batch(records: &[DepositData], vault: &Address) -> Result<(), MockError> {
    match records
        .iter()
        .find(|record| !invariant_withdraws_to_vault(record, vault))
    {
        Some(record) => Err(MockError::VaultMismatch {
            pubkey: record.pubkey,
            vault: *vault,
        }),
        None => Ok(()),
    }
}

/// Status changes follow the lifecycle unless overridden.
pub fn check_status_transition(
    pubkey: ValidatorPubkey,
    from: ValidatorStatus,
    to: ValidatorStatus,
) -> Result<(), MockError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(MockError::InvalidStatusTransition { pubkey, from, to })
    }
}

/// A user below the deployment's cap may take another minipool.
pub fn check_minipool_limit(user: &str, owned: usize, limit: Option<u32>) -> Result<(), MockError> {
    match limit {
        Some(limit) if owned >= limit as usize => Err(MockError::MinipoolLimitReached {
            user: user.to_string(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Every validator a node already owns must carry an exit message before it
/// gets another deposit signature.
pub fn check_exit_messages<'a>(
    owned: impl IntoIterator<Item = &'a ConstellationValidator>,
) -> Result<(), MockError> {
    match owned.into_iter().find(|v| v.requires_exit_message()) {
        Some(validator) => Err(MockError::MissingExitMessage(validator.pubkey)),
        None => Ok(()),
    }
}
