//! # Mock Errors
//!
//! Every failure the mock reports, plus the mapping to the wire-level error
//! keys a request layer sends back to clients.

use super::value_objects::{ValidatorPubkey, ValidatorStatus};
use ns_crypto::{to_checksum_address, Address, CryptoError};
use thiserror::Error;

/// Wire-level error keys.
pub mod error_keys {
    /// Unknown or unverified session token
    pub const INVALID_SESSION: &str = "invalid_session";
    /// Signature did not recover to the claimed address
    pub const INVALID_SIGNATURE: &str = "invalid_signature";
    /// Login nonce unknown or already consumed
    pub const INVALID_NONCE: &str = "invalid_nonce";
    /// Request parameters could not be parsed
    pub const MALFORMED_INPUT: &str = "malformed_input";
    /// Address has no registered node
    pub const UNREGISTERED_ADDRESS: &str = "unregistered_address";
    /// Address was already registered
    pub const ADDRESS_ALREADY_AUTHORIZED: &str = "address_already_authorized";
    /// Address was never whitelisted by a user
    pub const ADDRESS_MISSING_WHITELIST: &str = "address_missing_whitelist";
    /// Deployment does not exist
    pub const INVALID_DEPLOYMENT: &str = "invalid_deployment";
    /// Vault does not exist or does not match the deposit data
    pub const INVALID_VAULT: &str = "invalid_vault";
    /// User reached the deployment's minipool cap
    pub const MINIPOOL_LIMIT_REACHED: &str = "minipool_limit_reached";
    /// A validator owned by the node still needs an exit message
    pub const MISSING_EXIT_MESSAGE: &str = "missing_exit_message";
    /// Exit message already stored and the generation forbids overwrite
    pub const EXIT_MESSAGE_EXISTS: &str = "exit_message_exists";
    /// Node does not own the addressed resource
    pub const INVALID_PERMISSIONS: &str = "invalid_permissions";
    /// Administrative or configuration failure; never caused by client input
    pub const SERVER_ERROR: &str = "server_error";
}

/// Taxonomy class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed address, signature, or hex encoding
    InputValidation,
    /// Nonce, signature recovery, or registration state
    Authentication,
    /// Whitelisting, unknown resources, limits, missing keys
    Authorization,
    /// Resource already in the requested state
    Conflict,
    /// Administrative misuse of the mock itself
    Administrative,
}

/// Errors that can occur in the service mock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MockError {
    // =========================================================================
    // Input validation
    // =========================================================================
    /// Request parameters could not be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Recipient key for exit-message encryption is unusable
    #[error("Malformed recipient key: {0}")]
    MalformedRecipientKey(String),

    /// Encrypted exit message could not be opened or parsed
    #[error("Corrupt ciphertext: {0}")]
    CorruptCiphertext(String),

    // =========================================================================
    // Authentication
    // =========================================================================
    /// Unknown or unverified session token
    #[error("Invalid session")]
    InvalidSession,

    /// Login signature did not recover to the claimed address
    #[error("Invalid signature")]
    InvalidSignature,

    /// Registration signature recovered to another address
    #[error("Signature mismatch: expected {}, recovered {}", fmt_address(.expected), fmt_address(.actual))]
    SignatureMismatch {
        /// Claimed address
        expected: Address,
        /// Address recovered from the signature
        actual: Address,
    },

    /// Login nonce unknown (or consumed under the single-use policy)
    #[error("Invalid nonce")]
    InvalidNonce,

    /// Address has no registered node
    #[error("Node {} is not registered", fmt_address(.0))]
    UnregisteredNode(Address),

    /// Node was already registered
    #[error("Node {} is already registered", fmt_address(.0))]
    AlreadyRegistered(Address),

    // =========================================================================
    // Authorization / state
    // =========================================================================
    /// Address was never whitelisted by a user
    #[error("Node {} has not been whitelisted", fmt_address(.0))]
    AddressMissingWhitelist(Address),

    /// Deployment does not exist
    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    /// Vault does not exist in the deployment
    #[error("Vault not found: {}", fmt_address(.0))]
    VaultNotFound(Address),

    /// Deposit record's withdrawal credentials point at another address
    #[error("Deposit data for {pubkey} does not withdraw to vault {}", fmt_address(.vault))]
    VaultMismatch {
        /// Offending validator
        pubkey: ValidatorPubkey,
        /// Vault the upload was addressed to
        vault: Address,
    },

    /// User owns as many minipools as the deployment allows
    #[error("Minipool limit of {limit} reached for user {user}")]
    MinipoolLimitReached {
        /// Owning user's email
        user: String,
        /// Configured cap
        limit: u32,
    },

    /// Owned validator still needs an exit message
    #[error("Validator {0} is missing an exit message")]
    MissingExitMessage(ValidatorPubkey),

    /// Node does not own the addressed resource
    #[error("Invalid permissions: {0}")]
    InvalidPermissions(String),

    /// Signing requested before the deployment's admin key was set
    #[error("Deployment {0} has no admin private key")]
    MissingPrivateKey(String),

    // =========================================================================
    // Conflict
    // =========================================================================
    /// Exit message already stored for this validator
    #[error("Exit message already exists for {0}")]
    ExitMessageAlreadyExists(ValidatorPubkey),

    // =========================================================================
    // Administrative
    // =========================================================================
    /// No snapshot with this name
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// No user with this email
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Email already taken
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    /// Address already whitelisted by some user
    #[error("Node {} is already whitelisted", fmt_address(.0))]
    NodeAlreadyWhitelisted(Address),

    /// Deployment name already taken
    #[error("Deployment already exists: {0}")]
    DeploymentAlreadyExists(String),

    /// Vault already added to the deployment
    #[error("Vault already exists: {}", fmt_address(.0))]
    VaultAlreadyExists(Address),

    /// Validator unknown to the addressed vault or deployment
    #[error("Validator not found: {0}")]
    ValidatorNotFound(ValidatorPubkey),

    /// Pubkey already associated with a minipool
    #[error("Validator {0} already has a minipool")]
    MinipoolAlreadyAssigned(ValidatorPubkey),

    /// Status change not allowed by the lifecycle
    #[error("Invalid status transition for {pubkey}: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        /// Validator
        pubkey: ValidatorPubkey,
        /// Current status
        from: ValidatorStatus,
        /// Requested status
        to: ValidatorStatus,
    },

    /// Exit relay has no server-side identity
    #[error("Exit-message identity not configured")]
    IdentityNotConfigured,

    /// The admin key could not produce a signature
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

fn fmt_address(address: &Address) -> String {
    to_checksum_address(address)
}

impl MockError {
    /// The wire-level key reported to clients.
    pub fn error_key(&self) -> &'static str {
        use error_keys::*;
        match self {
            Self::MalformedInput(_)
            | Self::MalformedRecipientKey(_)
            | Self::CorruptCiphertext(_) => MALFORMED_INPUT,
            Self::InvalidSession => INVALID_SESSION,
            Self::InvalidSignature | Self::SignatureMismatch { .. } => INVALID_SIGNATURE,
            Self::InvalidNonce => INVALID_NONCE,
            Self::UnregisteredNode(_) => UNREGISTERED_ADDRESS,
            Self::AlreadyRegistered(_) => ADDRESS_ALREADY_AUTHORIZED,
            Self::AddressMissingWhitelist(_) => ADDRESS_MISSING_WHITELIST,
            Self::DeploymentNotFound(_) => INVALID_DEPLOYMENT,
            Self::VaultNotFound(_) | Self::VaultMismatch { .. } => INVALID_VAULT,
            Self::MinipoolLimitReached { .. } => MINIPOOL_LIMIT_REACHED,
            Self::MissingExitMessage(_) => MISSING_EXIT_MESSAGE,
            Self::ExitMessageAlreadyExists(_) => EXIT_MESSAGE_EXISTS,
            Self::InvalidPermissions(_) => INVALID_PERMISSIONS,
            Self::MissingPrivateKey(_)
            | Self::SnapshotNotFound(_)
            | Self::UserNotFound(_)
            | Self::UserAlreadyExists(_)
            | Self::NodeAlreadyWhitelisted(_)
            | Self::DeploymentAlreadyExists(_)
            | Self::VaultAlreadyExists(_)
            | Self::ValidatorNotFound(_)
            | Self::MinipoolAlreadyAssigned(_)
            | Self::InvalidStatusTransition { .. }
            | Self::IdentityNotConfigured
            | Self::SigningFailed(_) => SERVER_ERROR,
        }
    }

    /// Taxonomy class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedInput(_)
            | Self::MalformedRecipientKey(_)
            | Self::CorruptCiphertext(_) => ErrorCategory::InputValidation,
            Self::InvalidSession
            | Self::InvalidSignature
            | Self::SignatureMismatch { .. }
            | Self::InvalidNonce
            | Self::UnregisteredNode(_)
            | Self::AlreadyRegistered(_) => ErrorCategory::Authentication,
            Self::AddressMissingWhitelist(_)
            | Self::DeploymentNotFound(_)
            | Self::VaultNotFound(_)
            | Self::VaultMismatch { .. }
            | Self::MinipoolLimitReached { .. }
            | Self::MissingExitMessage(_)
            | Self::InvalidPermissions(_)
            | Self::MissingPrivateKey(_) => ErrorCategory::Authorization,
            Self::ExitMessageAlreadyExists(_) => ErrorCategory::Conflict,
            Self::SnapshotNotFound(_)
            | Self::UserNotFound(_)
            | Self::UserAlreadyExists(_)
            | Self::NodeAlreadyWhitelisted(_)
            | Self::DeploymentAlreadyExists(_)
            | Self::VaultAlreadyExists(_)
            | Self::ValidatorNotFound(_)
            | Self::MinipoolAlreadyAssigned(_)
            | Self::InvalidStatusTransition { .. }
            | Self::IdentityNotConfigured
            | Self::SigningFailed(_) => ErrorCategory::Administrative,
        }
    }

    /// Conditions caused by the mock's own setup rather than by a client.
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, Self::MissingPrivateKey(_) | Self::SigningFailed(_))
    }
}

impl From<CryptoError> for MockError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::SigningFailed(reason) => Self::SigningFailed(reason),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}
