//! Confirmation burst after an action dispatch

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

use crate::sync::reconciler::Reconciler;

/// Confirmation burst options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delays after dispatch at which the state is reconciled
    pub delays: Vec<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delays: (1..=5).map(|i| Duration::from_millis(i * 200)).collect(),
        }
    }
}

/// Schedule one reconciliation per delay after `dispatched_at`.
///
/// Every check is its own task with its own deadline, so a slow or hung
/// gateway call never delays the other checks.
pub fn spawn(
    options: &Options,
    dispatched_at: Instant,
    reconciler: Arc<Reconciler>,
    shutdown_tx: &broadcast::Sender<()>,
) {
    for delay in &options.delays {
        let deadline = dispatched_at + *delay;
        let reconciler = reconciler.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            check(
                deadline,
                &reconciler,
                Box::pin(async move {
                    let _ = shutdown_rx.recv().await;
                }),
            )
            .await;
        });
    }
}

/// Reconcile once at `deadline` unless shut down first
pub async fn check(
    deadline: Instant,
    reconciler: &Reconciler,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) {
    tokio::select! {
        biased;
        _ = &mut shutdown_signal => {
            debug!("Confirmation of contact {} cancelled", reconciler.contact().name);
            return;
        }
        _ = tokio::time::sleep_until(deadline) => {}
    }

    reconciler.reconcile().await;
}
