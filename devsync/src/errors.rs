//! Error types for the device sync engine

use thiserror::Error;

/// Main error type for the device sync engine
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Device configuration error: {0}")]
    DeviceConfigError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}
