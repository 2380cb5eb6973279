//! Active state polling worker

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info};

use crate::sync::reconciler::{ReconcileOutcome, Reconciler};

/// Active state worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Polling interval
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
        }
    }
}

/// Run the active state worker.
///
/// Reconciles once right away, then once per interval. Without an active
/// contact every tick is a no-op.
pub async fn run<S, F>(
    options: &Options,
    reconciler: Option<&Reconciler>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Active state worker starting...");

    let mut wait = Duration::ZERO;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("Active state worker shutting down...");
                return;
            }
            _ = sleep_fn(wait) => {}
        }
        wait = options.interval;

        let Some(reconciler) = reconciler else {
            continue;
        };

        if let ReconcileOutcome::Changed(is_active) = reconciler.reconcile().await {
            debug!(
                "Contact {} reconciled to active={}",
                reconciler.contact().name,
                is_active
            );
        }
    }
}
