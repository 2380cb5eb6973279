//! Beacon gateway models
//!
//! Device descriptors, readings and commands exchanged with the beacon gateway.

pub mod models;

pub use models::*;
