//! Beacon device sync
//!
//! Keeps one dashboard widget in sync with the state of a gateway device and
//! dispatches toggle commands to it.

pub mod app;
pub mod color;
pub mod display;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod storage;
pub mod sync;
pub mod utils;
pub mod workers;
