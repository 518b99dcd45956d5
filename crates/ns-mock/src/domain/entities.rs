//! # Domain Entities
//!
//! Everything the store owns. Entities are plain owned data so a store
//! snapshot is a `Clone` away.

use super::payloads::{DepositData, ExitMessage};
use super::value_objects::{AdminKey, ValidatorPubkey, ValidatorStatus};
use ns_crypto::Address;
use std::collections::{BTreeMap, BTreeSet};

/// Account that owns nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Account email; immutable identity
    pub email: String,
    /// Whitelisted node addresses, in whitelist order
    pub nodes: Vec<Address>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            nodes: Vec::new(),
        }
    }
}

/// Identifies one StakeWise vault across deployments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VaultKey {
    pub deployment: String,
    pub vault: Address,
}

impl VaultKey {
    pub fn new(deployment: impl Into<String>, vault: Address) -> Self {
        Self {
            deployment: deployment.into(),
            vault,
        }
    }
}

/// A node operator's address, whitelisted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub address: Address,
    /// Email of the owning user
    pub owner: String,
    /// Set once, by a verified registration signature
    pub registered: bool,
    /// StakeWise validators per vault, in upload order
    pub stakewise_validators: BTreeMap<VaultKey, Vec<StakeWiseValidator>>,
}

impl Node {
    pub fn new(address: Address, owner: impl Into<String>) -> Self {
        Self {
            address,
            owner: owner.into(),
            registered: false,
            stakewise_validators: BTreeMap::new(),
        }
    }

    /// Validators uploaded by this node to one vault.
    pub fn validators_in(&self, key: &VaultKey) -> &[StakeWiseValidator] {
        self.stakewise_validators
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable lookup of one validator in one vault.
    pub fn validator_mut(
        &mut self,
        key: &VaultKey,
        pubkey: &ValidatorPubkey,
    ) -> Option<&mut StakeWiseValidator> {
        self.stakewise_validators
            .get_mut(key)?
            .iter_mut()
            .find(|v| v.pubkey == *pubkey)
    }
}

/// Login session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nonce handed out, not yet verified
    NonceIssued,
    /// Nonce verified and bound to a node
    Verified,
}

/// One login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Challenge the node signs
    pub nonce: String,
    /// Bearer token, usable only once verified
    pub token: String,
    /// Node bound on successful login
    pub node: Option<Address>,
    pub state: SessionState,
}

impl Session {
    pub fn new(nonce: String, token: String) -> Self {
        Self {
            nonce,
            token,
            node: None,
            state: SessionState::NonceIssued,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.state == SessionState::Verified
    }

    /// Bind the session to `node`.
    pub fn verify(&mut self, node: Address) {
        self.node = Some(node);
        self.state = SessionState::Verified;
    }
}

/// A named chain environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub name: String,
    pub chain_id: u64,
    /// Contract that verifies whitelist signatures
    pub whitelist_address: Address,
    /// Contract that verifies minipool-deposit signatures
    pub factory_address: Address,
    /// Signing key; absent until configured
    pub admin_key: Option<AdminKey>,
    /// Replay-protection counters for whitelist signatures
    pub whitelist_nonces: BTreeMap<Address, u64>,
    /// Replay-protection counters for minipool-deposit signatures
    pub deposit_nonces: BTreeMap<Address, u64>,
    /// Per-user minipool cap; unlimited when absent
    pub minipool_limit: Option<u32>,
    pub vaults: BTreeMap<Address, Vault>,
    /// Constellation validators keyed by pubkey
    pub constellation: BTreeMap<ValidatorPubkey, ConstellationValidator>,
}

impl Deployment {
    pub fn new(
        name: impl Into<String>,
        chain_id: u64,
        whitelist_address: Address,
        factory_address: Address,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id,
            whitelist_address,
            factory_address,
            admin_key: None,
            whitelist_nonces: BTreeMap::new(),
            deposit_nonces: BTreeMap::new(),
            minipool_limit: None,
            vaults: BTreeMap::new(),
            constellation: BTreeMap::new(),
        }
    }

    pub fn whitelist_nonce(&self, address: &Address) -> u64 {
        self.whitelist_nonces.get(address).copied().unwrap_or(0)
    }

    pub fn deposit_nonce(&self, address: &Address) -> u64 {
        self.deposit_nonces.get(address).copied().unwrap_or(0)
    }

    /// Constellation validators owned by `node`, in pubkey order.
    pub fn constellation_validators_of<'a>(
        &'a self,
        node: &'a Address,
    ) -> impl Iterator<Item = &'a ConstellationValidator> + 'a {
        self.constellation.values().filter(move |v| v.node == *node)
    }
}

/// StakeWise vault state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vault {
    pub address: Address,
    /// Every pubkey ever uploaded to this vault
    pub known_pubkeys: BTreeSet<ValidatorPubkey>,
    /// Last committed deposit-data set
    pub current_set: Vec<DepositData>,
    /// Bumped once per committed set
    pub version: u64,
}

impl Vault {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }
}

/// A validator uploaded to a StakeWise vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeWiseValidator {
    pub pubkey: ValidatorPubkey,
    pub deposit_data: DepositData,
    pub status: ValidatorStatus,
    /// Included in a committed set
    pub used: bool,
    /// Confirmed active on the beacon chain
    pub marked_active: bool,
    pub exit_message: Option<ExitMessage>,
    pub exit_uploaded: bool,
}

impl StakeWiseValidator {
    /// Fresh validator from its first deposit upload.
    pub fn from_deposit(deposit_data: DepositData) -> Self {
        Self {
            pubkey: deposit_data.pubkey,
            deposit_data,
            status: ValidatorStatus::Pending,
            used: false,
            marked_active: false,
            exit_message: None,
            exit_uploaded: false,
        }
    }

    /// Eligible for the next deposit-data set.
    pub fn is_batchable(&self) -> bool {
        !self.used && self.status == ValidatorStatus::Pending
    }
}

/// A Constellation validator owned through a minipool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstellationValidator {
    pub pubkey: ValidatorPubkey,
    /// Owning node
    pub node: Address,
    pub minipool: Address,
    pub exit_message: Option<ExitMessage>,
}

impl ConstellationValidator {
    pub fn requires_exit_message(&self) -> bool {
        self.exit_message.is_none()
    }
}
