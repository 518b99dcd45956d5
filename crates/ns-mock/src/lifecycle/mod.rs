//! # Validator/Vault Lifecycle
//!
//! ## StakeWise
//!
//! ```text
//! UNKNOWN -> PENDING -> UPLOADED -> REGISTERED
//!                      (any non-terminal) -> REMOVED
//! ```
//!
//! Deposit data is uploaded per vault, batched fairly across users, and
//! committed as versioned sets.
//!
//! ## Constellation
//!
//! A node owns a validator once a minipool is associated with it, and the
//! validator requires an exit message until one is attached.

pub mod constellation;
pub mod stakewise;
