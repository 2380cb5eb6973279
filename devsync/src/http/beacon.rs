//! Beacon gateway API client

use async_trait::async_trait;
use beacon_models::{
    ConductRequest, DeviceContact, DeviceContactValue, HistoricalSample, HistoricalValue, RawValue,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::errors::SyncError;
use crate::http::client::HttpClient;

pub const DEVICE_STATE_PATH: &str = "/beacon/device-state";
pub const DEVICE_STATE_HISTORY_PATH: &str = "/beacon/device-state-history";
pub const CONDUCT_PATH: &str = "/beacon/conduct";

/// Gateway operations used by the engine
#[async_trait]
pub trait BeaconApi: Send + Sync {
    /// Get the current value of a device contact
    async fn get_device_state(
        &self,
        identifier: &str,
        contact: &DeviceContact,
    ) -> Result<DeviceContactValue, SyncError>;

    /// Get the samples of a contact between two instants
    async fn get_device_state_history(
        &self,
        identifier: &str,
        contact: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalValue>, SyncError>;

    /// Send a command to a device contact
    async fn conduct(&self, request: &ConductRequest) -> Result<(), SyncError>;
}

/// Format an instant the way the gateway expects, e.g. `2024-05-01T10:00:00.000Z`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl BeaconApi for HttpClient {
    async fn get_device_state(
        &self,
        identifier: &str,
        contact: &DeviceContact,
    ) -> Result<DeviceContactValue, SyncError> {
        let value: serde_json::Value = self
            .get(
                DEVICE_STATE_PATH,
                &[("identifier", identifier), ("contact", contact.name.as_str())],
            )
            .await?;

        Ok(DeviceContactValue {
            contact: contact.clone(),
            value: RawValue::from(value),
        })
    }

    async fn get_device_state_history(
        &self,
        identifier: &str,
        contact: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalValue>, SyncError> {
        let start = format_timestamp(start);
        let end = format_timestamp(end);
        let samples: Vec<HistoricalSample> = self
            .get(
                DEVICE_STATE_HISTORY_PATH,
                &[
                    ("identifier", identifier),
                    ("contact", contact),
                    ("startTimeStamp", start.as_str()),
                    ("endTimeStamp", end.as_str()),
                ],
            )
            .await?;

        let total = samples.len();
        let values: Vec<HistoricalValue> = samples
            .into_iter()
            .filter_map(HistoricalSample::numeric)
            .collect();
        if values.len() < total {
            debug!(
                "Skipped {} non-numeric samples of device {} (contact {})",
                total - values.len(),
                identifier,
                contact
            );
        }
        Ok(values)
    }

    async fn conduct(&self, request: &ConductRequest) -> Result<(), SyncError> {
        self.post_discard(CONDUCT_PATH, request).await
    }
}
