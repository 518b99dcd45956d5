//! # NodeSet Service Mock Test Suite
//!
//! Cross-module scenarios for the service mock.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Seeded mock, node keys, deposit and exit builders
//! └── integration/      # Scenarios spanning auth, signing, lifecycle, relay
//!     ├── auth_flow.rs
//!     ├── signature_flow.rs
//!     ├── stakewise_flow.rs
//!     ├── constellation_flow.rs
//!     ├── snapshot.rs
//!     └── concurrency.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ns-tests
//! cargo test -p ns-tests integration::stakewise_flow
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod fixtures;
