//! Engine configuration options

use std::time::Duration;

use crate::workers::{active, confirmation, history};

/// Options of a device engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Active state worker options
    pub active_poll: active::Options,

    /// Historical sampling worker options
    pub history: history::Options,

    /// Confirmation burst after a toggle
    pub confirmation: confirmation::Options,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            active_poll: active::Options::default(),
            history: history::Options::default(),
            confirmation: confirmation::Options::default(),
            max_shutdown_delay: Duration::from_secs(5),
        }
    }
}
