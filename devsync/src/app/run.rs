//! Device engine lifecycle

use std::sync::Arc;

use beacon_models::{ConductValue, DeviceConfiguration, DeviceContact, DisplayConfig, Icon};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::app::options::EngineOptions;
use crate::app::state::{DeviceSnapshot, DeviceState};
use crate::display::{self, Highlight};
use crate::errors::SyncError;
use crate::http::beacon::BeaconApi;
use crate::sync::dispatcher::ActionDispatcher;
use crate::sync::reconciler::Reconciler;
use crate::sync::sampler::{select_sampled_contact, HistoricalSampler};
use crate::sync::sink::ChangeSink;
use crate::workers::{active, history};

/// Synchronization engine of one device widget.
///
/// Activation resolves the display configuration and starts the workers.
/// Dropping the engine tears it down.
pub struct DeviceEngine {
    config: DeviceConfiguration,
    display: DisplayConfig,
    state: Arc<DeviceState>,
    dispatcher: Option<ActionDispatcher>,
    sampled_contact: Option<DeviceContact>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: ShutdownManager,
}

impl DeviceEngine {
    /// Activate the engine of a device. Must be called within a tokio runtime.
    pub fn activate(
        config: DeviceConfiguration,
        display_override: Option<DisplayConfig>,
        options: EngineOptions,
        gateway: Arc<dyn BeaconApi>,
        sink: Arc<dyn ChangeSink>,
    ) -> Self {
        info!("Activating device {}...", config.identifier);

        let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
        let mut shutdown_manager = ShutdownManager::new(options.max_shutdown_delay);

        let display_config = display::resolve_display_config(Some(&config), display_override);
        debug!(
            "Device {} display: {:?}",
            config.identifier, display_config
        );

        let state = Arc::new(DeviceState::new());

        let reconciler = display_config.active_contact_name.as_deref().map(|name| {
            Arc::new(Reconciler::new(
                &config,
                name,
                gateway.clone(),
                state.clone(),
                sink.clone(),
            ))
        });

        let dispatcher = display_config.action_contact_name.clone().map(|contact| {
            ActionDispatcher::new(
                config.identifier.clone(),
                contact,
                gateway.clone(),
                state.clone(),
                reconciler.clone(),
                options.confirmation.clone(),
                shutdown_tx.clone(),
            )
        });

        shutdown_manager.active_worker_handle = Some(init_active_worker(
            options.active_poll.clone(),
            reconciler,
            shutdown_tx.subscribe(),
        ));

        let sampled_contact = select_sampled_contact(&config).cloned();
        if options.history.enabled {
            match &sampled_contact {
                Some(contact) => {
                    let sampler = HistoricalSampler::new(
                        config.identifier.clone(),
                        contact.clone(),
                        options.history.window,
                        options.history.scale,
                        gateway.clone(),
                        state.clone(),
                    );
                    shutdown_manager.history_worker_handle = Some(init_history_worker(
                        options.history.clone(),
                        sampler,
                        shutdown_tx.subscribe(),
                    ));
                }
                None => {
                    debug!(
                        "Device {} has no numeric contact to sample",
                        config.identifier
                    );
                }
            }
        }

        Self {
            config,
            display: display_config,
            state,
            dispatcher,
            sampled_contact,
            shutdown_tx,
            shutdown_manager,
        }
    }

    pub fn configuration(&self) -> &DeviceConfiguration {
        &self.config
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn icon(&self) -> Option<Icon> {
        self.display.icon
    }

    pub fn display_name(&self) -> String {
        display::display_name(&self.display, Some(&self.config))
    }

    /// Whether the device accepts toggle commands
    pub fn is_actionable(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Contact charted by the history worker, if the device has one
    pub fn sampled_contact(&self) -> Option<&DeviceContact> {
        self.sampled_contact.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn historical_data(&self) -> Vec<beacon_models::HistoricalValue> {
        self.state.historical_data()
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.state.snapshot()
    }

    /// Subscribe to changes of the cached state
    pub fn subscribe(&self) -> watch::Receiver<DeviceSnapshot> {
        self.state.subscribe()
    }

    /// Highlight of the widget, optionally tinted by a color temperature
    pub fn highlight(&self, color_temp: Option<f64>) -> Option<Highlight> {
        display::highlight(&self.display, self.is_active(), color_temp)
    }

    /// Toggle the device.
    ///
    /// Inert on devices without an action contact and after teardown.
    pub fn toggle(&self) -> Option<ConductValue> {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.toggle(),
            None => {
                debug!(
                    "Device {} has no action contact, ignoring toggle",
                    self.config.identifier
                );
                None
            }
        }
    }

    /// Tear the engine down: stop the workers and pending confirmations and
    /// drop any result still in flight.
    pub fn deactivate(&self) {
        if self.state.is_closed() {
            return;
        }
        info!("Deactivating device {}...", self.config.identifier);
        self.state.close();
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_deactivated(&self) -> bool {
        self.state.is_closed()
    }

    /// Deactivate and wait for the workers to stop
    pub async fn shutdown(mut self) -> Result<(), SyncError> {
        self.deactivate();
        self.shutdown_manager.shutdown().await
    }
}

impl Drop for DeviceEngine {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// =============================== INITIALIZATION ================================== //

fn init_active_worker(
    options: active::Options,
    reconciler: Option<Arc<Reconciler>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        active::run(
            &options,
            reconciler.as_deref(),
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    })
}

fn init_history_worker(
    options: history::Options,
    sampler: HistoricalSampler,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        history::run(
            &options,
            &sampler,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    })
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    max_shutdown_delay: std::time::Duration,
    active_worker_handle: Option<JoinHandle<()>>,
    history_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    fn new(max_shutdown_delay: std::time::Duration) -> Self {
        Self {
            max_shutdown_delay,
            active_worker_handle: None,
            history_worker_handle: None,
        }
    }

    async fn shutdown(&mut self) -> Result<(), SyncError> {
        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, aborting workers...",
                    self.max_shutdown_delay
                );
                self.abort();
                Err(SyncError::ShutdownError(format!(
                    "workers still busy after {:?}",
                    self.max_shutdown_delay
                )))
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), SyncError> {
        // 1. Active state worker
        if let Some(handle) = self.active_worker_handle.as_mut() {
            handle
                .await
                .map_err(|e| SyncError::ShutdownError(e.to_string()))?;
            self.active_worker_handle = None;
        }

        // 2. History worker
        if let Some(handle) = self.history_worker_handle.as_mut() {
            handle
                .await
                .map_err(|e| SyncError::ShutdownError(e.to_string()))?;
            self.history_worker_handle = None;
        }

        info!("Device engine stopped");
        Ok(())
    }

    fn abort(&mut self) {
        for handle in [
            self.active_worker_handle.take(),
            self.history_worker_handle.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
    }
}
