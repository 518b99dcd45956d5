//! Session minting and token resolution.

use crate::domain::{MockError, Session};
use crate::store::Database;
use ns_crypto::Address;
use rand::RngCore;
use uuid::Uuid;

/// Random bytes in a login nonce.
pub const NONCE_BYTES: usize = 32;

/// Mint a fresh nonce and token and store the session.
pub fn create_session(db: &mut Database) -> Session {
    let mut nonce = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut nonce);
    let session = Session::new(hex::encode(nonce), Uuid::new_v4().to_string());
    db.add_session(session.clone());
    session
}

/// Resolve a verified session token to its node.
pub fn authenticate(db: &Database, token: &str) -> Result<Address, MockError> {
    match db.session_by_token(token) {
        Some(session) if session.is_verified() => session.node.ok_or(MockError::InvalidSession),
        _ => Err(MockError::InvalidSession),
    }
}

/// Drop the session carrying `token`.
pub fn logout(db: &mut Database, token: &str) -> Result<(), MockError> {
    if db.remove_session(token) {
        Ok(())
    } else {
        Err(MockError::InvalidSession)
    }
}
