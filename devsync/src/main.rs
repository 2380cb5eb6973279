//! Beacon device sync - Entry Point
//!
//! Runs the synchronization engine of one device headless, logging every
//! state change until interrupted.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use devsync::app::run::DeviceEngine;
use devsync::http::client::HttpClient;
use devsync::logs::{init_logging, LogOptions};
use devsync::storage::device::load_device;
use devsync::storage::layout::StorageLayout;
use devsync::storage::settings::Settings;
use devsync::sync::sink::LogSink;
use devsync::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => println!("Failed to render version: {e}"),
        }
        return;
    }

    let layout = cli_args
        .get("dir")
        .map(StorageLayout::new)
        .unwrap_or_default();

    // Retrieve the settings file, defaults when absent
    let settings_file = layout.settings_file();
    let mut settings = if settings_file.exists().await {
        match settings_file.read_json::<Settings>().await {
            Ok(settings) => settings,
            Err(e) => {
                println!("Unable to read settings file: {e}");
                return;
            }
        }
    } else {
        Settings::default()
    };
    if let Some(base_url) = cli_args.get("base-url") {
        settings.gateway.base_url = base_url.clone();
    }

    // Initialize logging
    if let Err(e) = init_logging(LogOptions::from(&settings)) {
        println!("Failed to initialize logging: {e}");
    }

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return;
    }

    let device_file = match load_device(&layout.device_file()).await {
        Ok(device_file) => device_file,
        Err(e) => {
            error!("Unable to load device: {}", e);
            return;
        }
    };

    let http_client = match HttpClient::new(
        &settings.gateway.base_url,
        Duration::from_secs(settings.gateway.request_timeout_secs),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let options = settings.engine_options();
    info!("Running device sync with options: {:?}", options);

    let engine = DeviceEngine::activate(
        device_file.device,
        device_file.display,
        options,
        http_client,
        Arc::new(LogSink),
    );
    info!(
        "Device {} ({:?}, actionable: {})",
        engine.display_name(),
        engine.icon(),
        engine.is_actionable()
    );

    if cli_args.contains_key("toggle") {
        // Let the first reconciliation land before flipping the state
        tokio::time::sleep(Duration::from_millis(500)).await;
        match engine.toggle() {
            Some(value) => info!("Toggle sent: {:?}", value),
            None => error!("Device {} cannot be toggled", engine.display_name()),
        }
    }

    let mut snapshots = engine.subscribe();
    let shutdown = await_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                info!(
                    "{} is {} ({} historical samples)",
                    engine.display_name(),
                    if snapshot.is_active { "active" } else { "inactive" },
                    snapshot.historical_data.len()
                );
            }
        }
    }

    if let Err(e) = engine.shutdown().await {
        error!("Failed to stop the device engine: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down...");
                    }
                    _ = sigint.recv() => {
                        info!("SIGINT received, shutting down...");
                    }
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
