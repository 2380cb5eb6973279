//! Configuration files of the engine

pub mod device;
pub mod layout;
pub mod settings;
