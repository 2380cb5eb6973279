//! Historical sampling worker

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::info;

use crate::sync::sampler::HistoricalSampler;

/// Historical sampling worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Whether the worker runs at all
    pub enabled: bool,

    /// Sampling interval
    pub interval: Duration,

    /// Length of the window fetched on each tick
    pub window: Duration,

    /// Divisor applied to every raw sample
    pub scale: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(10),
            window: Duration::from_secs(3600), // 1 hour
            scale: 10.0,
        }
    }
}

/// Run the historical sampling worker, first sampling one interval after start
pub async fn run<S, F>(
    options: &Options,
    sampler: &HistoricalSampler,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!(
        "History worker starting for contact {}...",
        sampler.contact().name
    );

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("History worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {}
        }

        sampler.sample().await;
    }
}
