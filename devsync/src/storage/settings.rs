//! Settings file management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::options::EngineOptions;
use crate::errors::SyncError;
use crate::logs::LogLevel;
use crate::workers::{active, confirmation, history};

/// Engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Active state polling
    #[serde(default)]
    pub polling: PollingSettings,

    /// Historical sampling
    #[serde(default)]
    pub history: HistorySettings,

    /// Confirmation burst after a toggle
    #[serde(default)]
    pub confirmation: ConfirmationSettings,
}

impl Settings {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), SyncError> {
        Url::parse(&self.gateway.base_url).map_err(|e| {
            SyncError::ConfigError(format!("Invalid gateway URL {}: {}", self.gateway.base_url, e))
        })?;

        if self.polling.active_interval_ms == 0 {
            return Err(SyncError::ConfigError(
                "Active polling interval must be positive".to_string(),
            ));
        }

        if self.history.interval_ms == 0 {
            return Err(SyncError::ConfigError(
                "History interval must be positive".to_string(),
            ));
        }

        if !self.history.scale.is_finite() || self.history.scale == 0.0 {
            return Err(SyncError::ConfigError(format!(
                "Invalid history scale: {}",
                self.history.scale
            )));
        }

        Ok(())
    }

    /// Engine options described by these settings
    pub fn engine_options(&self) -> EngineOptions {
        let mut delays_ms = self.confirmation.delays_ms.clone();
        delays_ms.sort_unstable();

        EngineOptions {
            active_poll: active::Options {
                interval: Duration::from_millis(self.polling.active_interval_ms),
            },
            history: history::Options {
                enabled: self.history.enabled,
                interval: Duration::from_millis(self.history.interval_ms),
                window: Duration::from_secs(self.history.window_secs),
                scale: self.history.scale,
            },
            confirmation: confirmation::Options {
                delays: delays_ms.into_iter().map(Duration::from_millis).collect(),
            },
            ..Default::default()
        }
    }
}

/// Gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Base URL of the beacon gateway
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// Transport timeout of a single request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "http://192.168.0.20:5000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Active state polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Interval between two reconciliations in milliseconds
    #[serde(default = "default_active_interval")]
    pub active_interval_ms: u64,
}

fn default_active_interval() -> u64 {
    3000
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            active_interval_ms: default_active_interval(),
        }
    }
}

/// Historical sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Enable the history worker
    #[serde(default)]
    pub enabled: bool,

    /// Interval between two samplings in milliseconds
    #[serde(default = "default_history_interval")]
    pub interval_ms: u64,

    /// Length of the sampled window in seconds
    #[serde(default = "default_history_window")]
    pub window_secs: u64,

    /// Divisor applied to raw samples
    #[serde(default = "default_history_scale")]
    pub scale: f64,
}

fn default_history_interval() -> u64 {
    10_000
}

fn default_history_window() -> u64 {
    3600
}

fn default_history_scale() -> f64 {
    10.0
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_history_interval(),
            window_secs: default_history_window(),
            scale: default_history_scale(),
        }
    }
}

/// Confirmation burst settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationSettings {
    /// Delays after a toggle at which the state is checked, in milliseconds
    #[serde(default = "default_confirmation_delays")]
    pub delays_ms: Vec<u64>,
}

fn default_confirmation_delays() -> Vec<u64> {
    vec![200, 400, 600, 800, 1000]
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            delays_ms: default_confirmation_delays(),
        }
    }
}
