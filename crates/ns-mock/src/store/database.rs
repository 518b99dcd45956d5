//! # Database
//!
//! The live entity store. Every entity is owned here; `Clone` is a full deep
//! copy, which is what snapshots rely on.

use crate::domain::{Deployment, MockError, Node, Session, User, Vault, VaultKey};
use ns_crypto::{Address, RelayIdentity};
use std::collections::BTreeMap;

/// All mock state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    /// Users in creation order
    users: Vec<User>,
    nodes: BTreeMap<Address, Node>,
    /// Sessions in creation order; never garbage-collected
    sessions: Vec<Session>,
    deployments: BTreeMap<String, Deployment>,
    /// Server-side identity of the exit-message relay
    exit_identity: Option<RelayIdentity>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // USERS & NODES
    // =========================================================================

    pub fn add_user(&mut self, email: &str) -> Result<(), MockError> {
        if self.user(email).is_some() {
            return Err(MockError::UserAlreadyExists(email.to_string()));
        }
        self.users.push(User::new(email));
        Ok(())
    }

    pub fn user(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Users in creation order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Create the node for `address`, owned by `email`.
    pub fn whitelist_node(&mut self, email: &str, address: Address) -> Result<(), MockError> {
        if self.nodes.contains_key(&address) {
            return Err(MockError::NodeAlreadyWhitelisted(address));
        }
        let user = self
            .users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| MockError::UserNotFound(email.to_string()))?;
        user.nodes.push(address);
        self.nodes.insert(address, Node::new(address, email));
        Ok(())
    }

    pub fn node(&self, address: &Address) -> Option<&Node> {
        self.nodes.get(address)
    }

    /// Whitelisted node or `AddressMissingWhitelist`.
    pub fn whitelisted_node(&self, address: &Address) -> Result<&Node, MockError> {
        self.nodes
            .get(address)
            .ok_or(MockError::AddressMissingWhitelist(*address))
    }

    pub fn whitelisted_node_mut(&mut self, address: &Address) -> Result<&mut Node, MockError> {
        self.nodes
            .get_mut(address)
            .ok_or(MockError::AddressMissingWhitelist(*address))
    }

    /// Whitelisted and registered node.
    pub fn registered_node(&self, address: &Address) -> Result<&Node, MockError> {
        let node = self.whitelisted_node(address)?;
        if node.registered {
            Ok(node)
        } else {
            Err(MockError::UnregisteredNode(*address))
        }
    }

    /// Registered nodes of `user`, in whitelist order.
    pub fn registered_nodes_of<'a>(&'a self, user: &'a User) -> impl Iterator<Item = &'a Node> + 'a {
        user.nodes
            .iter()
            .filter_map(|address| self.nodes.get(address))
            .filter(|node| node.registered)
    }

    /// All nodes, in address order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    // =========================================================================
    // SESSIONS
    // =========================================================================

    pub fn add_session(&mut self, session: Session) {
        self.sessions.push(session);
    }

    pub fn session_by_nonce_mut(&mut self, nonce: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.nonce == nonce)
    }

    pub fn session_by_token(&self, token: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.token == token)
    }

    /// Drop the session carrying `token`. Returns whether one existed.
    pub fn remove_session(&mut self, token: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.token != token);
        self.sessions.len() != before
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // =========================================================================
    // DEPLOYMENTS & VAULTS
    // =========================================================================

    pub fn add_deployment(&mut self, deployment: Deployment) -> Result<(), MockError> {
        if self.deployments.contains_key(&deployment.name) {
            return Err(MockError::DeploymentAlreadyExists(deployment.name));
        }
        self.deployments.insert(deployment.name.clone(), deployment);
        Ok(())
    }

    pub fn deployment(&self, name: &str) -> Result<&Deployment, MockError> {
        self.deployments
            .get(name)
            .ok_or_else(|| MockError::DeploymentNotFound(name.to_string()))
    }

    pub fn deployment_mut(&mut self, name: &str) -> Result<&mut Deployment, MockError> {
        self.deployments
            .get_mut(name)
            .ok_or_else(|| MockError::DeploymentNotFound(name.to_string()))
    }

    pub fn add_vault(&mut self, deployment: &str, address: Address) -> Result<(), MockError> {
        let deployment = self.deployment_mut(deployment)?;
        if deployment.vaults.contains_key(&address) {
            return Err(MockError::VaultAlreadyExists(address));
        }
        deployment.vaults.insert(address, Vault::new(address));
        Ok(())
    }

    pub fn vault(&self, key: &VaultKey) -> Result<&Vault, MockError> {
        self.deployment(&key.deployment)?
            .vaults
            .get(&key.vault)
            .ok_or(MockError::VaultNotFound(key.vault))
    }

    pub fn vault_mut(&mut self, key: &VaultKey) -> Result<&mut Vault, MockError> {
        self.deployment_mut(&key.deployment)?
            .vaults
            .get_mut(&key.vault)
            .ok_or(MockError::VaultNotFound(key.vault))
    }

    // =========================================================================
    // RELAY IDENTITY
    // =========================================================================

    pub fn exit_identity(&self) -> Option<&RelayIdentity> {
        self.exit_identity.as_ref()
    }

    pub fn set_exit_identity(&mut self, identity: RelayIdentity) {
        self.exit_identity = Some(identity);
    }
}
