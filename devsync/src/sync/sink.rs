//! State change records

use serde::Serialize;
use tracing::info;

/// A change of a device's canonical state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub identifier: String,
    pub alias: Option<String>,
    pub contact_name: String,
    pub contact_data_type: Option<String>,
    pub raw_value: String,
    pub raw_type: &'static str,
    pub is_active: bool,
}

/// Receives state change records
pub trait ChangeSink: Send + Sync {
    fn record(&self, change: &StateChange);
}

/// Writes state changes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ChangeSink for LogSink {
    fn record(&self, change: &StateChange) {
        info!(
            identifier = %change.identifier,
            alias = ?change.alias,
            contact = %change.contact_name,
            data_type = ?change.contact_data_type,
            raw_type = change.raw_type,
            is_active = change.is_active,
            "Device state change, value: {}",
            change.raw_value
        );
    }
}
