//! # Session/Auth Subsystem
//!
//! Per login flow: `NONCE_ISSUED -> VERIFIED`.
//!
//! - [`create_session`] mints a nonce and a pre-auth token
//! - [`register`] flips a whitelisted node to registered
//! - [`login`] verifies the signed challenge and binds the session
//! - [`authenticate`] resolves a verified token to its node

mod login;
mod registration;
mod session;

pub use login::login;
pub use registration::register;
pub use session::{authenticate, create_session, logout, NONCE_BYTES};
