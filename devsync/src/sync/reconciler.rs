//! Active state reconciliation

use std::sync::Arc;

use beacon_models::{DeviceConfiguration, DeviceContact};
use tracing::{debug, warn};

use crate::app::state::{DeviceState, StateUpdate};
use crate::http::beacon::BeaconApi;
use crate::sync::normalize::normalize;
use crate::sync::sink::{ChangeSink, StateChange};

/// Outcome of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The cached state changed to the given value
    Changed(bool),

    /// The gateway agrees with the cached state
    Unchanged,

    /// The gateway could not be reached, the cached state was kept
    Failed,

    /// The engine is torn down, nothing was fetched or written
    Skipped,
}

/// Keeps the cached active state in line with the gateway
pub struct Reconciler {
    identifier: String,
    alias: Option<String>,
    contact: DeviceContact,
    gateway: Arc<dyn BeaconApi>,
    state: Arc<DeviceState>,
    sink: Arc<dyn ChangeSink>,
}

impl Reconciler {
    /// Create a reconciler for one contact of a device.
    ///
    /// The contact's data type is taken from the main endpoint when declared there.
    pub fn new(
        config: &DeviceConfiguration,
        contact_name: &str,
        gateway: Arc<dyn BeaconApi>,
        state: Arc<DeviceState>,
        sink: Arc<dyn ChangeSink>,
    ) -> Self {
        let contact = config
            .find_contact(contact_name)
            .cloned()
            .unwrap_or_else(|| DeviceContact::named(contact_name));

        Self {
            identifier: config.identifier.clone(),
            alias: config.alias.clone(),
            contact,
            gateway,
            state,
            sink,
        }
    }

    pub fn contact(&self) -> &DeviceContact {
        &self.contact
    }

    /// Fetch, normalize and store the contact's state
    pub async fn reconcile(&self) -> ReconcileOutcome {
        if self.state.is_closed() {
            return ReconcileOutcome::Skipped;
        }

        let reading = match self
            .gateway
            .get_device_state(&self.identifier, &self.contact)
            .await
        {
            Ok(reading) => reading,
            Err(e) => {
                warn!(
                    "Failed to refresh state of device {} (contact {}): {}",
                    self.identifier, self.contact.name, e
                );
                return ReconcileOutcome::Failed;
            }
        };

        match self
            .state
            .update_active(|previous| normalize(&reading.value, previous))
        {
            StateUpdate::Changed(is_active) => {
                self.sink.record(&StateChange {
                    identifier: self.identifier.clone(),
                    alias: self.alias.clone(),
                    contact_name: reading.contact.name.clone(),
                    contact_data_type: reading.contact.data_type.clone(),
                    raw_value: reading.value.to_string(),
                    raw_type: reading.value.type_name(),
                    is_active,
                });
                ReconcileOutcome::Changed(is_active)
            }
            StateUpdate::Unchanged => ReconcileOutcome::Unchanged,
            StateUpdate::Closed => {
                debug!(
                    "Dropping late state of device {} received after teardown",
                    self.identifier
                );
                ReconcileOutcome::Skipped
            }
        }
    }
}
