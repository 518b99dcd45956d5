//! # Payloads
//!
//! Records exchanged with clients: deposit data, exit messages, and the read
//! views returned by listing operations.

use super::value_objects::{ValidatorPubkey, ValidatorStatus};
use ns_crypto::{Address, RecoverableSignature};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};

/// BLS signature length.
pub const BLS_SIGNATURE_LENGTH: usize = 96;

/// One deposit record as produced by a deposit-data CLI.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositData {
    /// Validator public key
    pub pubkey: ValidatorPubkey,
    /// Withdrawal credentials; the last 20 bytes name the withdrawal address
    #[serde_as(as = "Hex")]
    pub withdrawal_credentials: [u8; 32],
    /// Deposit amount in gwei
    pub amount: u64,
    /// Deposit signature
    #[serde_as(as = "Hex")]
    pub signature: [u8; BLS_SIGNATURE_LENGTH],
    #[serde_as(as = "Hex")]
    pub deposit_message_root: [u8; 32],
    #[serde_as(as = "Hex")]
    pub deposit_data_root: [u8; 32],
    #[serde_as(as = "Hex")]
    pub fork_version: [u8; 4],
    /// Beacon network name, e.g. `holesky`
    pub network_name: String,
}

impl DepositData {
    /// Address the withdrawal credentials pay out to.
    pub fn withdrawal_address(&self) -> Address {
        let mut address = [0u8; 20];
        address.copy_from_slice(&self.withdrawal_credentials[12..]);
        address
    }
}

/// Body of a voluntary exit.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMessageDetails {
    #[serde_as(as = "DisplayFromStr")]
    pub epoch: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub validator_index: u64,
}

/// Signed voluntary exit.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMessage {
    pub message: ExitMessageDetails,
    #[serde_as(as = "Hex")]
    pub signature: [u8; BLS_SIGNATURE_LENGTH],
}

/// Exit message for one validator, sealed for the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedExitData {
    pub pubkey: ValidatorPubkey,
    /// Hex of `ephemeral_pub || nonce || ciphertext`
    pub encrypted_exit_message: String,
}

/// StakeWise validator as reported to its node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeWiseValidatorInfo {
    pub pubkey: ValidatorPubkey,
    pub status: ValidatorStatus,
    pub exit_message_uploaded: bool,
}

/// Constellation validator as reported to its node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstellationValidatorInfo {
    pub pubkey: ValidatorPubkey,
    #[serde_as(as = "Hex")]
    pub minipool: Address,
    pub requires_exit_message: bool,
}

/// Current deposit-data set of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositDataSet {
    pub version: u64,
    pub deposit_data: Vec<DepositData>,
}

/// Signature issued on behalf of a deployment's contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSignature {
    /// 65-byte signature with the recovery byte in {27, 28}
    pub signature: RecoverableSignature,
    /// Replay-protection nonce folded into the hash
    pub nonce: u64,
    pub chain_id: u64,
    /// Contract that will verify the signature
    pub contract: Address,
}
