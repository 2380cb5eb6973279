//! Action dispatch with confirmation

use std::sync::Arc;

use beacon_models::{ConductRequest, ConductTarget, ConductValue, MAIN_CHANNEL};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::app::state::DeviceState;
use crate::http::beacon::BeaconApi;
use crate::sync::reconciler::Reconciler;
use crate::workers::confirmation;

/// Flips the actionable contact of a device
pub struct ActionDispatcher {
    identifier: String,
    action_contact: String,
    gateway: Arc<dyn BeaconApi>,
    state: Arc<DeviceState>,
    reconciler: Option<Arc<Reconciler>>,
    options: confirmation::Options,
    shutdown_tx: broadcast::Sender<()>,
}

impl ActionDispatcher {
    pub fn new(
        identifier: String,
        action_contact: String,
        gateway: Arc<dyn BeaconApi>,
        state: Arc<DeviceState>,
        reconciler: Option<Arc<Reconciler>>,
        options: confirmation::Options,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            identifier,
            action_contact,
            gateway,
            state,
            reconciler,
            options,
            shutdown_tx,
        }
    }

    /// Send the command flipping the cached state, then confirm the new state
    /// with a burst of reconciliations.
    ///
    /// The command response is not awaited and the command is sent even if the
    /// engine is torn down right after. Returns `None` once torn down.
    pub fn toggle(&self) -> Option<ConductValue> {
        if self.state.is_closed() {
            return None;
        }

        let value = ConductValue::toggled_from(self.state.is_active());
        let request = ConductRequest {
            target: ConductTarget {
                identifier: self.identifier.clone(),
                channel: MAIN_CHANNEL.to_string(),
                contact: self.action_contact.clone(),
            },
            value,
        };
        info!(
            "Sending {:?} to device {} contact {}",
            value, self.identifier, self.action_contact
        );

        let dispatched_at = Instant::now();

        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway.conduct(&request).await {
                warn!(
                    "Failed to conduct device {} (contact {}): {}",
                    request.target.identifier, request.target.contact, e
                );
            }
        });

        if let Some(reconciler) = &self.reconciler {
            confirmation::spawn(
                &self.options,
                dispatched_at,
                reconciler.clone(),
                &self.shutdown_tx,
            );
        }

        Some(value)
    }
}
