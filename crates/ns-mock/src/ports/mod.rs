//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: the client-facing API
//! - **Outbound (Driven)**: signer recovery

pub mod inbound;
pub mod outbound;
