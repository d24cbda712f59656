//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod json_store;
pub mod ports;
pub mod settings;
