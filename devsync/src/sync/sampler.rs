//! Historical sampling of a numeric contact

use std::sync::Arc;
use std::time::Duration;

use beacon_models::{DeviceConfiguration, DeviceContact, HistoricalValue};
use chrono::Utc;
use tracing::{debug, warn};

use crate::app::state::DeviceState;
use crate::http::beacon::BeaconApi;

/// Numeric contacts that are never charted
pub const EXCLUDED_CONTACTS: [&str; 2] = ["battery", "linkquality"];

/// The contact whose history is charted: the first numeric main input that
/// is not a housekeeping signal
pub fn select_sampled_contact(config: &DeviceConfiguration) -> Option<&DeviceContact> {
    config
        .main_endpoint()?
        .inputs
        .iter()
        .find(|c| c.is_numeric() && !EXCLUDED_CONTACTS.contains(&c.name.as_str()))
}

/// Outcome of one sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The series was replaced with this many samples
    Updated(usize),

    /// The gateway could not be reached, the previous series was kept
    Failed,

    /// The engine is torn down, nothing was fetched or written
    Skipped,
}

/// Fetches a rolling window of a contact's history
pub struct HistoricalSampler {
    identifier: String,
    contact: DeviceContact,
    window: Duration,
    scale: f64,
    gateway: Arc<dyn BeaconApi>,
    state: Arc<DeviceState>,
}

impl HistoricalSampler {
    pub fn new(
        identifier: String,
        contact: DeviceContact,
        window: Duration,
        scale: f64,
        gateway: Arc<dyn BeaconApi>,
        state: Arc<DeviceState>,
    ) -> Self {
        Self {
            identifier,
            contact,
            window,
            scale,
            gateway,
            state,
        }
    }

    pub fn contact(&self) -> &DeviceContact {
        &self.contact
    }

    /// Refetch the window ending now and replace the cached series
    pub async fn sample(&self) -> SampleOutcome {
        if self.state.is_closed() {
            return SampleOutcome::Skipped;
        }

        let end = Utc::now();
        let window = chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::hours(1));
        let start = end - window;

        let samples = match self
            .gateway
            .get_device_state_history(&self.identifier, &self.contact.name, start, end)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(
                    "Failed to load historical data of device {} (contact {}): {}",
                    self.identifier, self.contact.name, e
                );
                return SampleOutcome::Failed;
            }
        };

        let rescaled: Vec<HistoricalValue> = samples
            .into_iter()
            .map(|s| HistoricalValue {
                time_stamp: s.time_stamp,
                value: s.value / self.scale,
            })
            .collect();
        let count = rescaled.len();

        if !self.state.replace_history(rescaled) {
            debug!(
                "Dropping late history of device {} received after teardown",
                self.identifier
            );
            return SampleOutcome::Skipped;
        }

        debug!("Loaded {} samples for device {}", count, self.identifier);
        SampleOutcome::Updated(count)
    }
}
