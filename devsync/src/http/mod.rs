//! Gateway HTTP client

pub mod beacon;
pub mod client;
