//! # NodeSet Service Mock
//!
//! In-process test double for the NodeSet staking-coordination service.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): entities, value types, payloads, errors
//! - **Store** (`store/`): the live database and named snapshots
//! - **Components**: `auth/`, `signing/`, `lifecycle/`, `relay`
//! - **Ports Layer** (`ports/`): `NodeSetMockApi` inbound, `SignatureVerifier` outbound
//! - **Service Layer** (`service.rs`): `MockManager`, locking and telemetry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ns_mock::{MockConfig, MockManager, NodeSetMockApi};
//!
//! let mock = MockManager::new(MockConfig::from_env());
//! mock.add_user("alice@example.com")?;
//! mock.whitelist_node("alice@example.com", node_address)?;
//! mock.snapshot("baseline");
//!
//! let session = mock.create_session();
//! let token = mock.login(node_address, &session.nonce, &signature)?;
//!
//! mock.revert("baseline")?;
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod domain;
pub mod lifecycle;
pub mod ports;
pub mod relay;
pub mod service;
pub mod signing;
pub mod store;

// Re-export public API
pub use config::MockConfig;
pub use domain::{
    error_keys, AdminKey, ApiGeneration, ConstellationValidatorInfo, DepositData, DepositDataSet,
    EncryptedExitData, ErrorCategory, ExitMessage, ExitMessageDetails,
    ExitMessagePolicy, IssuedSignature, MessageTemplates, MockError, NonceReusePolicy, Session,
    StakeWiseValidatorInfo, ValidatorPubkey, ValidatorStatus,
};
pub use ports::inbound::NodeSetMockApi;
pub use ports::outbound::{EcrecoverVerifier, SignatureVerifier};
pub use relay::{decrypt_exit_message, encrypt_exit_message};
pub use service::MockManager;
pub use store::Database;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
