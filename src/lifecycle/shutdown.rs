//! Shutdown coordination.

use tokio::sync::broadcast;

/// Ordered stop signals for the two long-running tasks.
///
/// Checks and the API listen on separate channels so the caller can stop
/// ticking first and only then start draining HTTP requests.
pub struct Shutdown {
    checks: broadcast::Sender<()>,
    api: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (checks, _) = broadcast::channel(1);
        let (api, _) = broadcast::channel(1);
        Self { checks, api }
    }

    /// Receiver for the check worker.
    pub fn subscribe_checks(&self) -> broadcast::Receiver<()> {
        self.checks.subscribe()
    }

    /// Receiver for the API server.
    pub fn subscribe_api(&self) -> broadcast::Receiver<()> {
        self.api.subscribe()
    }

    /// Stop scheduling new checks.
    pub fn stop_checks(&self) {
        let _ = self.checks.send(());
    }

    /// Stop accepting HTTP connections and start draining.
    pub fn stop_api(&self) {
        let _ = self.api.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
