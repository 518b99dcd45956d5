//! # Mock Manager
//!
//! Application service that owns the live [`Database`] and the snapshot
//! registry and implements [`NodeSetMockApi`].
//!
//! ## Locking
//!
//! - `database`: one `RwLock`; every mutation takes the write side
//! - `snapshots`: one `Mutex`, always taken before `database`
//!
//! Reads return owned values, so nothing handed out survives a revert.

use parking_lot::{Mutex, RwLock};
use primitive_types::U256;
use tracing::{debug, error, info, warn};

use crate::auth;
use crate::config::MockConfig;
use crate::domain::{
    AdminKey, ConstellationValidatorInfo, DepositData, DepositDataSet, Deployment,
    EncryptedExitData, IssuedSignature, MessageTemplates, MockError, Session,
    StakeWiseValidatorInfo, ValidatorPubkey, ValidatorStatus, VaultKey,
};
use crate::lifecycle::{constellation, stakewise};
use crate::ports::inbound::NodeSetMockApi;
use crate::ports::outbound::{EcrecoverVerifier, SignatureVerifier};
use crate::signing;
use crate::store::{Database, SnapshotRegistry};
use ns_crypto::{to_checksum_address, Address, RecoverableSignature, RelayIdentity, RelayRecipient};
use ns_telemetry::{
    log_node_event, log_rejection, metric_inc, register_metrics, DEPOSIT_DATA_SETS_COMMITTED,
    DEPOSIT_DATA_STORED, EXIT_MESSAGES_STORED, LOGIN_ATTEMPTS, NODES_REGISTERED, REQUESTS_REJECTED, SESSIONS_CREATED,
    SIGNATURES_ISSUED, SNAPSHOTS_HELD, SNAPSHOT_REVERTS,
};

/// Log and count a rejected request, handing the error back.
fn rejected(operation: &'static str, err: MockError) -> MockError {
    if err.is_programmer_error() {
        error!(operation, error_key = err.error_key(), error = %err, "Mock misconfigured");
    } else {
        log_rejection!(operation, err.error_key(), "Request rejected", error = %err);
    }
    metric_inc!(REQUESTS_REJECTED, &[err.error_key()]);
    err
}

/// The service mock.
///
/// Thread-safe; share it across tasks behind an `Arc`.
pub struct MockManager<V: SignatureVerifier = EcrecoverVerifier> {
    config: MockConfig,
    /// Resolved once from `config`
    templates: MessageTemplates,
    verifier: V,
    database: RwLock<Database>,
    snapshots: Mutex<SnapshotRegistry>,
}

impl MockManager {
    /// Manager with the default ecrecover verifier.
    pub fn new(config: MockConfig) -> Self {
        Self::with_verifier(config, EcrecoverVerifier)
    }
}

impl Default for MockManager {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl<V: SignatureVerifier> MockManager<V> {
    pub fn with_verifier(config: MockConfig, verifier: V) -> Self {
        if let Err(e) = register_metrics() {
            warn!(error = %e, "Metrics unavailable");
        }
        info!(
            generation = ?config.generation,
            nonce_policy = ?config.nonce_policy,
            "Service mock created"
        );
        Self {
            templates: config.templates(),
            config,
            verifier,
            database: RwLock::new(Database::new()),
            snapshots: Mutex::new(SnapshotRegistry::new()),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Message templates in effect.
    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    /// Deep copy of the live store.
    pub fn database(&self) -> Database {
        self.database.read().clone()
    }

    /// Resolve a token to its node under an already-held lock.
    fn node_for(operation: &'static str, db: &Database, token: &str) -> Result<Address, MockError> {
        auth::authenticate(db, token).map_err(|e| rejected(operation, e))
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Store a copy of the live store under `name`.
    pub fn snapshot(&self, name: &str) {
        let mut snapshots = self.snapshots.lock();
        snapshots.take(name, &self.database.read());
        SNAPSHOTS_HELD.set(snapshots.len() as f64);
        info!(snapshot = name, "Snapshot taken");
    }

    /// Replace the live store with a copy of snapshot `name`.
    pub fn revert(&self, name: &str) -> Result<(), MockError> {
        let snapshots = self.snapshots.lock();
        let restored = snapshots
            .restore(name)
            .map_err(|e| rejected("revert", e))?;
        *self.database.write() = restored;
        metric_inc!(SNAPSHOT_REVERTS);
        info!(snapshot = name, "Reverted to snapshot");
        Ok(())
    }

    pub fn delete_snapshot(&self, name: &str) -> Result<(), MockError> {
        let mut snapshots = self.snapshots.lock();
        snapshots
            .remove(name)
            .map_err(|e| rejected("delete_snapshot", e))?;
        SNAPSHOTS_HELD.set(snapshots.len() as f64);
        Ok(())
    }

    pub fn snapshot_names(&self) -> Vec<String> {
        self.snapshots.lock().names()
    }

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================

    pub fn add_user(&self, email: &str) -> Result<(), MockError> {
        self.database
            .write()
            .add_user(email)
            .map_err(|e| rejected("add_user", e))?;
        info!(user = email, "User added");
        Ok(())
    }

    /// Whitelist `address` as a node of `email`.
    pub fn whitelist_node(&self, email: &str, address: Address) -> Result<(), MockError> {
        self.database
            .write()
            .whitelist_node(email, address)
            .map_err(|e| rejected("whitelist_node", e))?;
        log_node_event!(info, "Node whitelisted", to_checksum_address(&address), user = email);
        Ok(())
    }

    pub fn add_deployment(
        &self,
        name: &str,
        chain_id: u64,
        whitelist_address: Address,
        factory_address: Address,
    ) -> Result<(), MockError> {
        let deployment = Deployment::new(name, chain_id, whitelist_address, factory_address);
        self.database
            .write()
            .add_deployment(deployment)
            .map_err(|e| rejected("add_deployment", e))?;
        info!(deployment = name, chain_id, "Deployment added");
        Ok(())
    }

    pub fn set_admin_private_key(&self, deployment: &str, key: AdminKey) -> Result<(), MockError> {
        let signer = to_checksum_address(&key.address());
        self.database
            .write()
            .deployment_mut(deployment)
            .map_err(|e| rejected("set_admin_private_key", e))?
            .admin_key = Some(key);
        info!(deployment, %signer, "Admin key set");
        Ok(())
    }

    /// Per-user minipool cap for the deployment; `None` lifts it.
    pub fn set_minipool_limit(&self, deployment: &str, limit: Option<u32>) -> Result<(), MockError> {
        self.database
            .write()
            .deployment_mut(deployment)
            .map_err(|e| rejected("set_minipool_limit", e))?
            .minipool_limit = limit;
        info!(deployment, ?limit, "Minipool limit set");
        Ok(())
    }

    pub fn add_stakewise_vault(&self, deployment: &str, vault: Address) -> Result<(), MockError> {
        self.database
            .write()
            .add_vault(deployment, vault)
            .map_err(|e| rejected("add_stakewise_vault", e))?;
        info!(deployment, vault = %to_checksum_address(&vault), "Vault added");
        Ok(())
    }

    /// Install the relay's server-side identity.
    pub fn set_exit_identity(&self, identity: RelayIdentity) {
        let recipient = identity.recipient().to_hex();
        self.database.write().set_exit_identity(identity);
        info!(%recipient, "Exit-message identity set");
    }

    /// Public key clients seal exit messages to.
    pub fn exit_recipient(&self) -> Option<RelayRecipient> {
        self.database.read().exit_identity().map(RelayIdentity::recipient)
    }

    pub fn whitelist_nonce(&self, deployment: &str, address: &Address) -> Result<u64, MockError> {
        Ok(self.database.read().deployment(deployment)?.whitelist_nonce(address))
    }

    pub fn deposit_nonce(&self, deployment: &str, address: &Address) -> Result<u64, MockError> {
        Ok(self.database.read().deployment(deployment)?.deposit_nonce(address))
    }

    pub fn increment_whitelist_nonce(&self, deployment: &str, address: Address) -> Result<u64, MockError> {
        let nonce = signing::increment_whitelist_nonce(&mut self.database.write(), deployment, address)
            .map_err(|e| rejected("increment_whitelist_nonce", e))?;
        log_node_event!(info, "Whitelist nonce advanced", to_checksum_address(&address), deployment, nonce);
        Ok(nonce)
    }

    pub fn increment_deposit_nonce(&self, deployment: &str, address: Address) -> Result<u64, MockError> {
        let nonce = signing::increment_deposit_nonce(&mut self.database.write(), deployment, address)
            .map_err(|e| rejected("increment_deposit_nonce", e))?;
        log_node_event!(info, "Deposit nonce advanced", to_checksum_address(&address), deployment, nonce);
        Ok(nonce)
    }

    // =========================================================================
    // STAKEWISE ADMINISTRATION
    // =========================================================================

    /// Next fair-share deposit-data set for the vault.
    pub fn create_deposit_data_set(
        &self,
        deployment: &str,
        vault: Address,
        per_user_limit: usize,
    ) -> Result<Vec<DepositData>, MockError> {
        let key = VaultKey::new(deployment, vault);
        let set = stakewise::create_deposit_data_set(&self.database.read(), &key, per_user_limit)
            .map_err(|e| rejected("create_deposit_data_set", e))?;
        debug!(deployment, size = set.len(), "Deposit-data set assembled");
        Ok(set)
    }

    /// Commit `set` as the vault's current set; returns the new version.
    pub fn commit_deposit_data_set(
        &self,
        deployment: &str,
        vault: Address,
        set: Vec<DepositData>,
    ) -> Result<u64, MockError> {
        let key = VaultKey::new(deployment, vault);
        let size = set.len();
        let version = stakewise::commit_deposit_data_set(&mut self.database.write(), &key, set)
            .map_err(|e| rejected("commit_deposit_data_set", e))?;
        metric_inc!(DEPOSIT_DATA_SETS_COMMITTED);
        info!(deployment, vault = %to_checksum_address(&vault), version, size, "Deposit-data set committed");
        Ok(version)
    }

    pub fn mark_validators_registered(
        &self,
        deployment: &str,
        vault: Address,
        pubkeys: &[ValidatorPubkey],
    ) -> Result<(), MockError> {
        let key = VaultKey::new(deployment, vault);
        stakewise::mark_validators_registered(&mut self.database.write(), &key, pubkeys)
            .map_err(|e| rejected("mark_validators_registered", e))?;
        info!(deployment, count = pubkeys.len(), "Validators registered");
        Ok(())
    }

    pub fn mark_validator_removed(
        &self,
        deployment: &str,
        vault: Address,
        pubkey: &ValidatorPubkey,
    ) -> Result<(), MockError> {
        let key = VaultKey::new(deployment, vault);
        stakewise::mark_validator_removed(&mut self.database.write(), &key, pubkey)
            .map_err(|e| rejected("mark_validator_removed", e))?;
        info!(deployment, %pubkey, "Validator removed");
        Ok(())
    }

    /// Set a validator's status without lifecycle checks.
    pub fn override_validator_status(
        &self,
        deployment: &str,
        vault: Address,
        pubkey: &ValidatorPubkey,
        status: ValidatorStatus,
    ) -> Result<(), MockError> {
        let key = VaultKey::new(deployment, vault);
        stakewise::override_validator_status(&mut self.database.write(), &key, pubkey, status)
            .map_err(|e| rejected("override_validator_status", e))?;
        info!(deployment, %pubkey, ?status, "Validator status overridden");
        Ok(())
    }

    // =========================================================================
    // CONSTELLATION ADMINISTRATION
    // =========================================================================

    /// Give `node` ownership of `pubkey` through `minipool`.
    pub fn add_minipool(
        &self,
        deployment: &str,
        node: Address,
        minipool: Address,
        pubkey: ValidatorPubkey,
    ) -> Result<(), MockError> {
        constellation::add_minipool(&mut self.database.write(), deployment, &node, minipool, pubkey)
            .map_err(|e| rejected("add_minipool", e))?;
        log_node_event!(
            info,
            "Minipool associated",
            to_checksum_address(&node),
            deployment,
            minipool = %to_checksum_address(&minipool),
            %pubkey
        );
        Ok(())
    }
}

impl<V: SignatureVerifier> NodeSetMockApi for MockManager<V> {
    fn create_session(&self) -> Session {
        let session = auth::create_session(&mut self.database.write());
        metric_inc!(SESSIONS_CREATED);
        debug!(token = %session.token, "Session created");
        session
    }

    fn register_node(
        &self,
        email: &str,
        address: Address,
        signature: &RecoverableSignature,
    ) -> Result<(), MockError> {
        auth::register(
            &mut self.database.write(),
            &self.verifier,
            &self.templates,
            email,
            address,
            signature,
        )
        .map_err(|e| rejected("register_node", e))?;
        metric_inc!(NODES_REGISTERED);
        log_node_event!(info, "Node registered", to_checksum_address(&address), user = email);
        Ok(())
    }

    fn login(
        &self,
        address: Address,
        nonce: &str,
        signature: &RecoverableSignature,
    ) -> Result<String, MockError> {
        let result = auth::login(
            &mut self.database.write(),
            &self.verifier,
            &self.templates,
            self.config.nonce_policy,
            address,
            nonce,
            signature,
        );
        match result {
            Ok(token) => {
                metric_inc!(LOGIN_ATTEMPTS, &["success"]);
                log_node_event!(info, "Node logged in", to_checksum_address(&address));
                Ok(token)
            }
            Err(e) => {
                metric_inc!(LOGIN_ATTEMPTS, &["failure"]);
                Err(rejected("login", e))
            }
        }
    }

    fn logout(&self, token: &str) -> Result<(), MockError> {
        auth::logout(&mut self.database.write(), token).map_err(|e| rejected("logout", e))?;
        debug!("Session dropped");
        Ok(())
    }

    fn upload_deposit_data(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
        records: Vec<DepositData>,
    ) -> Result<usize, MockError> {
        const OP: &str = "upload_deposit_data";
        let mut db = self.database.write();
        let node = Self::node_for(OP, &db, token)?;
        let key = VaultKey::new(deployment, vault);
        let stored = stakewise::upload_deposit_data(&mut db, &key, &node, records)
            .map_err(|e| rejected(OP, e))?;
        DEPOSIT_DATA_STORED.inc_by(stored as f64);
        log_node_event!(info, "Deposit data uploaded", to_checksum_address(&node), deployment, stored);
        Ok(stored)
    }

    fn get_deposit_data_meta(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<u64, MockError> {
        const OP: &str = "get_deposit_data_meta";
        let db = self.database.read();
        Self::node_for(OP, &db, token)?;
        stakewise::deposit_data_version(&db, &VaultKey::new(deployment, vault))
            .map_err(|e| rejected(OP, e))
    }

    fn get_deposit_data(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<DepositDataSet, MockError> {
        const OP: &str = "get_deposit_data";
        let db = self.database.read();
        Self::node_for(OP, &db, token)?;
        stakewise::deposit_data_set(&db, &VaultKey::new(deployment, vault))
            .map_err(|e| rejected(OP, e))
    }

    fn get_stakewise_validators(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<Vec<StakeWiseValidatorInfo>, MockError> {
        const OP: &str = "get_stakewise_validators";
        let db = self.database.read();
        let node = Self::node_for(OP, &db, token)?;
        stakewise::validators_of(&db, &VaultKey::new(deployment, vault), &node)
            .map_err(|e| rejected(OP, e))
    }

    fn upload_signed_exits(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
        exits: &[EncryptedExitData],
    ) -> Result<usize, MockError> {
        const OP: &str = "upload_signed_exits";
        let mut db = self.database.write();
        let node = Self::node_for(OP, &db, token)?;
        let key = VaultKey::new(deployment, vault);
        let stored = stakewise::upload_signed_exits(&mut db, &key, &node, exits)
            .map_err(|e| rejected(OP, e))?;
        EXIT_MESSAGES_STORED
            .with_label_values(&["stakewise"])
            .inc_by(stored as f64);
        log_node_event!(info, "Signed exits uploaded", to_checksum_address(&node), deployment, stored);
        Ok(stored)
    }

    fn get_whitelist_signature(
        &self,
        token: &str,
        deployment: &str,
    ) -> Result<IssuedSignature, MockError> {
        const OP: &str = "get_whitelist_signature";
        let db = self.database.read();
        let node = Self::node_for(OP, &db, token)?;
        let issued = signing::whitelist_signature(&db, deployment, &node)
            .map_err(|e| rejected(OP, e))?;
        metric_inc!(SIGNATURES_ISSUED, &["whitelist"]);
        log_node_event!(debug, "Whitelist signature issued", to_checksum_address(&node), deployment, nonce = issued.nonce);
        Ok(issued)
    }

    fn get_minipool_deposit_signature(
        &self,
        token: &str,
        deployment: &str,
        minipool: Address,
        salt: U256,
    ) -> Result<IssuedSignature, MockError> {
        const OP: &str = "get_minipool_deposit_signature";
        let db = self.database.read();
        let node = Self::node_for(OP, &db, token)?;
        let issued = signing::minipool_deposit_signature(&db, deployment, &node, minipool, salt)
            .map_err(|e| rejected(OP, e))?;
        metric_inc!(SIGNATURES_ISSUED, &["minipool_deposit"]);
        log_node_event!(debug, "Minipool deposit signature issued", to_checksum_address(&node), deployment, nonce = issued.nonce);
        Ok(issued)
    }

    fn get_constellation_validators(
        &self,
        token: &str,
        deployment: &str,
    ) -> Result<Vec<ConstellationValidatorInfo>, MockError> {
        const OP: &str = "get_constellation_validators";
        let db = self.database.read();
        let node = Self::node_for(OP, &db, token)?;
        constellation::validators_of(&db, deployment, &node).map_err(|e| rejected(OP, e))
    }

    fn upload_constellation_exits(
        &self,
        token: &str,
        deployment: &str,
        exits: &[EncryptedExitData],
    ) -> Result<usize, MockError> {
        const OP: &str = "upload_constellation_exits";
        let mut db = self.database.write();
        let node = Self::node_for(OP, &db, token)?;
        let stored = constellation::upload_exits(
            &mut db,
            deployment,
            &node,
            exits,
            self.config.exit_message_policy(),
        )
        .map_err(|e| rejected(OP, e))?;
        EXIT_MESSAGES_STORED
            .with_label_values(&["constellation"])
            .inc_by(stored as f64);
        log_node_event!(info, "Minipool exits uploaded", to_checksum_address(&node), deployment, stored);
        Ok(stored)
    }
}
