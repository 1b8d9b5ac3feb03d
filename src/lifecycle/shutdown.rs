//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The server subscribes before it starts serving; a single trigger stops
/// accepting connections and lets in-flight requests finish.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Returns how many subscribers were told.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Trigger once an OS termination signal arrives.
    pub async fn trigger_on_signal(self) {
        super::signals::wait_for_signal().await;
        let notified = self.trigger();
        tracing::debug!(notified, "Shutdown triggered by signal");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
