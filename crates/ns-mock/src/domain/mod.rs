//! # Domain Layer
//!
//! Entities, value types, payloads, and errors. No locking and no I/O.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod payloads;
pub mod value_objects;

pub use entities::*;
pub use errors::{error_keys, ErrorCategory, MockError};
pub use payloads::*;
pub use value_objects::*;
