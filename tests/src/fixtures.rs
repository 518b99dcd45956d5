//! Shared fixtures: a seeded mock and helpers that act as node clients.

use std::sync::Arc;

use ns_crypto::{Address, RelayIdentity, Secp256k1KeyPair};
use ns_mock::{
    AdminKey, DepositData, EncryptedExitData, ExitMessage, ExitMessageDetails, MockConfig,
    MockManager, NodeSetMockApi, ValidatorPubkey,
};

pub const DEPLOYMENT: &str = "holesky-dev";
pub const CHAIN_ID: u64 = 17000;
pub const WHITELIST: Address = [0xA1; 20];
pub const FACTORY: Address = [0xF1; 20];
pub const VAULT: Address = [0xAA; 20];

/// A node operator client.
pub struct TestNode {
    pub email: String,
    pub key: Secp256k1KeyPair,
}

impl TestNode {
    pub fn address(&self) -> Address {
        self.key.address()
    }
}

/// A mock seeded with one deployment, one vault, an admin key, and a relay
/// identity.
pub struct TestEnv {
    pub mock: Arc<MockManager>,
    pub admin: Secp256k1KeyPair,
    pub relay: RelayIdentity,
}

impl TestEnv {
    pub fn new(config: MockConfig) -> Self {
        let _ = ns_telemetry::init_logging(&ns_telemetry::TelemetryConfig::for_tests());

        let mock = Arc::new(MockManager::new(config));
        let admin = Secp256k1KeyPair::generate();
        let relay = RelayIdentity::generate();

        mock.add_deployment(DEPLOYMENT, CHAIN_ID, WHITELIST, FACTORY)
            .unwrap();
        mock.set_admin_private_key(DEPLOYMENT, AdminKey::from(admin.clone()))
            .unwrap();
        mock.add_stakewise_vault(DEPLOYMENT, VAULT).unwrap();
        mock.set_exit_identity(relay.clone());

        Self { mock, admin, relay }
    }

    /// Create the user if needed and whitelist a fresh node key under it.
    pub fn whitelisted_node(&self, email: &str) -> TestNode {
        if self.mock.database().user(email).is_none() {
            self.mock.add_user(email).unwrap();
        }
        let key = Secp256k1KeyPair::generate();
        self.mock.whitelist_node(email, key.address()).unwrap();
        TestNode {
            email: email.to_string(),
            key,
        }
    }

    /// Sign and submit the registration message.
    pub fn register(&self, node: &TestNode) {
        let message = self
            .mock
            .templates()
            .register_message(&node.email, &node.address());
        let signature = node.key.sign_personal_message(message.as_bytes()).unwrap();
        self.mock
            .register_node(&node.email, node.address(), &signature)
            .unwrap();
    }

    /// Log in with an existing nonce.
    pub fn login_with(&self, node: &TestNode, nonce: &str) -> Result<String, ns_mock::MockError> {
        let message = self.mock.templates().login_message(nonce, &node.address());
        let signature = node.key.sign_personal_message(message.as_bytes()).unwrap();
        self.mock.login(node.address(), nonce, &signature)
    }

    /// Fresh session, logged in; returns the token.
    pub fn login(&self, node: &TestNode) -> String {
        let session = self.mock.create_session();
        self.login_with(node, &session.nonce).unwrap()
    }

    /// Whitelisted, registered, logged-in node.
    pub fn active_node(&self, email: &str) -> (TestNode, String) {
        let node = self.whitelisted_node(email);
        self.register(&node);
        let token = self.login(&node);
        (node, token)
    }

    /// Exit message sealed to the relay identity.
    pub fn sealed_exit(&self, pubkey: ValidatorPubkey, validator_index: u64) -> EncryptedExitData {
        let recipient = self.mock.exit_recipient().unwrap().to_hex();
        EncryptedExitData {
            pubkey,
            encrypted_exit_message: ns_mock::encrypt_exit_message(
                &exit_message(validator_index),
                &recipient,
            )
            .unwrap(),
        }
    }
}

/// Deterministic pubkey from one byte.
pub fn pubkey(byte: u8) -> ValidatorPubkey {
    ValidatorPubkey::from_bytes([byte; 48])
}

/// Deposit record for `pubkey(byte)` withdrawing to `vault`.
pub fn deposit_data(byte: u8, vault: Address) -> DepositData {
    let mut withdrawal_credentials = [0u8; 32];
    withdrawal_credentials[0] = 0x01;
    withdrawal_credentials[12..].copy_from_slice(&vault);
    DepositData {
        pubkey: pubkey(byte),
        withdrawal_credentials,
        amount: 32_000_000_000,
        signature: [byte; 96],
        deposit_message_root: [0x0d; 32],
        deposit_data_root: [0x0e; 32],
        fork_version: [0x01, 0x01, 0x70, 0x00],
        network_name: "holesky".to_string(),
    }
}

pub fn exit_message(validator_index: u64) -> ExitMessage {
    ExitMessage {
        message: ExitMessageDetails {
            epoch: 256,
            validator_index,
        },
        signature: [0x5e; 96],
    }
}
