//! # Inbound Ports (Driving Ports / API)
//!
//! What a request-handling layer calls on behalf of node clients. Calls that
//! act as a node take the session token and resolve it first; a token whose
//! nonce was never verified is `InvalidSession`.

use crate::domain::{
    ConstellationValidatorInfo, DepositData, DepositDataSet, EncryptedExitData, IssuedSignature,
    MockError, Session, StakeWiseValidatorInfo,
};
use ns_crypto::{Address, RecoverableSignature};
use primitive_types::U256;

/// Client-facing NodeSet API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait NodeSetMockApi: Send + Sync {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// Mint a login nonce and its pre-auth token.
    fn create_session(&self) -> Session;

    /// Register a whitelisted node with a signature over the registration
    /// message.
    fn register_node(
        &self,
        email: &str,
        address: Address,
        signature: &RecoverableSignature,
    ) -> Result<(), MockError>;

    /// Verify a signed login challenge; returns the session token.
    fn login(
        &self,
        address: Address,
        nonce: &str,
        signature: &RecoverableSignature,
    ) -> Result<String, MockError>;

    /// Drop a session.
    fn logout(&self, token: &str) -> Result<(), MockError>;

    // =========================================================================
    // StakeWise
    // =========================================================================

    /// Upload deposit records; returns how many were new.
    fn upload_deposit_data(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
        records: Vec<DepositData>,
    ) -> Result<usize, MockError>;

    /// Version of the vault's current deposit-data set.
    fn get_deposit_data_meta(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<u64, MockError>;

    /// The vault's current deposit-data set.
    fn get_deposit_data(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<DepositDataSet, MockError>;

    /// Validators the caller uploaded to the vault.
    fn get_stakewise_validators(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
    ) -> Result<Vec<StakeWiseValidatorInfo>, MockError>;

    /// Upload sealed exit messages for the caller's validators.
    fn upload_signed_exits(
        &self,
        token: &str,
        deployment: &str,
        vault: Address,
        exits: &[EncryptedExitData],
    ) -> Result<usize, MockError>;

    // =========================================================================
    // Constellation
    // =========================================================================

    /// Signature whitelisting the caller on the deployment's whitelist
    /// contract.
    fn get_whitelist_signature(
        &self,
        token: &str,
        deployment: &str,
    ) -> Result<IssuedSignature, MockError>;

    /// Signature authorizing a minipool deposit by the caller.
    fn get_minipool_deposit_signature(
        &self,
        token: &str,
        deployment: &str,
        minipool: Address,
        salt: U256,
    ) -> Result<IssuedSignature, MockError>;

    /// Validators the caller owns through minipools.
    fn get_constellation_validators(
        &self,
        token: &str,
        deployment: &str,
    ) -> Result<Vec<ConstellationValidatorInfo>, MockError>;

    /// Upload sealed exit messages for the caller's minipool validators.
    fn upload_constellation_exits(
        &self,
        token: &str,
        deployment: &str,
        exits: &[EncryptedExitData],
    ) -> Result<usize, MockError>;
}
