//! Per-device engine state

use std::sync::atomic::{AtomicBool, Ordering};

use beacon_models::HistoricalValue;
use serde::Serialize;
use tokio::sync::watch;

/// Observable state of one device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    /// Last reconciled canonical state
    pub is_active: bool,

    /// Rescaled historical series of the sampled contact
    pub historical_data: Vec<HistoricalValue>,
}

/// Result of writing the active state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    /// The cached state changed to the given value
    Changed(bool),

    /// The new value matched the cached one, nothing was written
    Unchanged,

    /// The engine has been torn down, the value was dropped
    Closed,
}

/// Cached state of one device, owned by its engine.
///
/// Observers are only notified when a value actually changes. Once closed,
/// every write is dropped so late network results cannot land in a torn down
/// instance.
pub struct DeviceState {
    snapshot: watch::Sender<DeviceSnapshot>,
    closed: AtomicBool,
}

impl DeviceState {
    /// Create the initial, inactive state
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(DeviceSnapshot::default());
        Self {
            snapshot,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.snapshot.borrow().is_active
    }

    pub fn historical_data(&self) -> Vec<HistoricalValue> {
        self.snapshot.borrow().historical_data.clone()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.subscribe()
    }

    /// Compute the new active state from the cached one and store it if it differs
    pub fn update_active(&self, next: impl FnOnce(bool) -> bool) -> StateUpdate {
        let mut update = StateUpdate::Closed;
        self.snapshot.send_if_modified(|snapshot| {
            if self.is_closed() {
                return false;
            }
            let is_active = next(snapshot.is_active);
            if is_active == snapshot.is_active {
                update = StateUpdate::Unchanged;
                return false;
            }
            snapshot.is_active = is_active;
            update = StateUpdate::Changed(is_active);
            true
        });
        update
    }

    /// Replace the historical series wholesale
    pub fn replace_history(&self, samples: Vec<HistoricalValue>) -> bool {
        self.snapshot.send_if_modified(|snapshot| {
            if self.is_closed() {
                return false;
            }
            snapshot.historical_data = samples;
            true
        })
    }

    /// Stop accepting writes
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
