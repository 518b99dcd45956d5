//! StakeWise vaults: deposit-data uploads, versioned sets, status machine,
//! and signed exits.
//!
//! Every operation validates its whole input before touching the store, so
//! a rejected batch leaves nothing behind.

use crate::domain::invariants::{check_deposit_batch, check_status_transition};
use crate::domain::{
    DepositData, DepositDataSet, EncryptedExitData, ExitMessage, MockError, StakeWiseValidator,
    StakeWiseValidatorInfo, ValidatorPubkey, ValidatorStatus, VaultKey,
};
use crate::relay::decrypt_exit_message;
use crate::store::Database;
use ns_crypto::Address;

/// Node that uploaded `pubkey` to the vault.
fn owner_of(db: &Database, key: &VaultKey, pubkey: &ValidatorPubkey) -> Result<Address, MockError> {
    db.nodes()
        .find(|node| node.validators_in(key).iter().any(|v| v.pubkey == *pubkey))
        .map(|node| node.address)
        .ok_or(MockError::ValidatorNotFound(*pubkey))
}

fn validator<'a>(
    db: &'a Database,
    key: &VaultKey,
    pubkey: &ValidatorPubkey,
) -> Result<&'a StakeWiseValidator, MockError> {
    let owner = owner_of(db, key, pubkey)?;
    db.whitelisted_node(&owner)?
        .validators_in(key)
        .iter()
        .find(|v| v.pubkey == *pubkey)
        .ok_or(MockError::ValidatorNotFound(*pubkey))
}

fn validator_mut<'a>(
    db: &'a mut Database,
    key: &VaultKey,
    pubkey: &ValidatorPubkey,
) -> Result<&'a mut StakeWiseValidator, MockError> {
    let owner = owner_of(db, key, pubkey)?;
    db.whitelisted_node_mut(&owner)?
        .validator_mut(key, pubkey)
        .ok_or(MockError::ValidatorNotFound(*pubkey))
}

// =============================================================================
// DEPOSIT DATA
// =============================================================================

/// Store new deposit records for `node`. Known pubkeys are skipped.
///
/// Returns the number of records actually stored.
pub fn upload_deposit_data(
    db: &mut Database,
    key: &VaultKey,
    node: &Address,
    records: Vec<DepositData>,
) -> Result<usize, MockError> {
    db.registered_node(node)?;
    check_deposit_batch(&records, &key.vault)?;

    let vault = db.vault_mut(key)?;
    let fresh: Vec<StakeWiseValidator> = records
        .into_iter()
        .filter(|record| vault.known_pubkeys.insert(record.pubkey))
        .map(StakeWiseValidator::from_deposit)
        .collect();
    let stored = fresh.len();

    db.whitelisted_node_mut(node)?
        .stakewise_validators
        .entry(key.clone())
        .or_default()
        .extend(fresh);
    Ok(stored)
}

/// Next deposit-data set: up to `per_user_limit` unused validators per user.
///
/// Users in creation order, then their registered nodes in whitelist order,
/// then validators in upload order.
pub fn create_deposit_data_set(
    db: &Database,
    key: &VaultKey,
    per_user_limit: usize,
) -> Result<Vec<DepositData>, MockError> {
    db.vault(key)?;

    let mut set = Vec::new();
    for user in db.users() {
        let picked = db
            .registered_nodes_of(user)
            .flat_map(|node| node.validators_in(key))
            .filter(|validator| validator.is_batchable())
            .take(per_user_limit)
            .map(|validator| validator.deposit_data.clone());
        set.extend(picked);
    }
    Ok(set)
}

/// Make `set` the vault's current set and bump its version by one.
///
/// Every validator in the set is marked used; pending ones move to
/// `UPLOADED`.
pub fn commit_deposit_data_set(
    db: &mut Database,
    key: &VaultKey,
    set: Vec<DepositData>,
) -> Result<u64, MockError> {
    db.vault(key)?;
    for record in &set {
        validator(db, key, &record.pubkey)?;
    }

    for record in &set {
        let validator = validator_mut(db, key, &record.pubkey)?;
        validator.used = true;
        if validator.status == ValidatorStatus::Pending {
            validator.status = ValidatorStatus::Uploaded;
        }
    }

    let vault = db.vault_mut(key)?;
    vault.version += 1;
    vault.current_set = set;
    Ok(vault.version)
}

/// Version of the vault's current set.
pub fn deposit_data_version(db: &Database, key: &VaultKey) -> Result<u64, MockError> {
    Ok(db.vault(key)?.version)
}

/// Version and contents of the vault's current set.
pub fn deposit_data_set(db: &Database, key: &VaultKey) -> Result<DepositDataSet, MockError> {
    let vault = db.vault(key)?;
    Ok(DepositDataSet {
        version: vault.version,
        deposit_data: vault.current_set.clone(),
    })
}

// =============================================================================
// STATUS
// =============================================================================

/// Move every pubkey to `REGISTERED`; all must be `UPLOADED`.
pub fn mark_validators_registered(
    db: &mut Database,
    key: &VaultKey,
    pubkeys: &[ValidatorPubkey],
) -> Result<(), MockError> {
    db.vault(key)?;
    for pubkey in pubkeys {
        let current = validator(db, key, pubkey)?.status;
        check_status_transition(*pubkey, current, ValidatorStatus::Registered)?;
    }
    for pubkey in pubkeys {
        let validator = validator_mut(db, key, pubkey)?;
        validator.status = ValidatorStatus::Registered;
        validator.marked_active = true;
    }
    Ok(())
}

/// Record a confirmed exit.
pub fn mark_validator_removed(
    db: &mut Database,
    key: &VaultKey,
    pubkey: &ValidatorPubkey,
) -> Result<(), MockError> {
    db.vault(key)?;
    let validator = validator_mut(db, key, pubkey)?;
    check_status_transition(*pubkey, validator.status, ValidatorStatus::Removed)?;
    validator.status = ValidatorStatus::Removed;
    Ok(())
}

/// Set a status without lifecycle checks.
pub fn override_validator_status(
    db: &mut Database,
    key: &VaultKey,
    pubkey: &ValidatorPubkey,
    status: ValidatorStatus,
) -> Result<(), MockError> {
    db.vault(key)?;
    validator_mut(db, key, pubkey)?.status = status;
    Ok(())
}

/// Validators `node` uploaded to the vault.
pub fn validators_of(
    db: &Database,
    key: &VaultKey,
    node: &Address,
) -> Result<Vec<StakeWiseValidatorInfo>, MockError> {
    db.vault(key)?;
    Ok(db
        .registered_node(node)?
        .validators_in(key)
        .iter()
        .map(|v| StakeWiseValidatorInfo {
            pubkey: v.pubkey,
            status: v.status,
            exit_message_uploaded: v.exit_uploaded,
        })
        .collect())
}

// =============================================================================
// EXITS
// =============================================================================

/// Store sealed exit messages for validators `node` owns in the vault.
///
/// A later message for the same validator replaces the earlier one.
pub fn upload_signed_exits(
    db: &mut Database,
    key: &VaultKey,
    node: &Address,
    exits: &[EncryptedExitData],
) -> Result<usize, MockError> {
    db.vault(key)?;
    let owned = db.registered_node(node)?.validators_in(key);

    let mut opened: Vec<(ValidatorPubkey, ExitMessage)> = Vec::with_capacity(exits.len());
    for exit in exits {
        if !owned.iter().any(|v| v.pubkey == exit.pubkey) {
            return Err(MockError::InvalidPermissions(format!(
                "validator {} does not belong to this node",
                exit.pubkey
            )));
        }
        let message = decrypt_exit_message(db.exit_identity(), &exit.encrypted_exit_message)?;
        opened.push((exit.pubkey, message));
    }

    let node = db.whitelisted_node_mut(node)?;
    for (pubkey, message) in opened.iter().cloned() {
        if let Some(validator) = node.validator_mut(key, &pubkey) {
            validator.exit_message = Some(message);
            validator.exit_uploaded = true;
        }
    }
    Ok(opened.len())
}
