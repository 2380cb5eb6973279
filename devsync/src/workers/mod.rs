//! Background workers of a device engine

pub mod active;
pub mod confirmation;
pub mod history;
