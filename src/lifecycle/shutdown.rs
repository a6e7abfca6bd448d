//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// Handles shutdown signals (SIGTERM, SIGINT, SIGHUP).
///
/// Handlers are installed on construction, so a signal arriving before
/// `wait` is called is not lost. Must be created inside a tokio runtime.
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
    sighup: Signal,
}

impl ShutdownSignal {
    /// Install the signal handlers
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            sighup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for a shutdown signal and return its name
    pub async fn wait(&mut self) -> &'static str {
        let name = tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
            _ = self.sighup.recv() => "SIGHUP",
        };
        debug!(signal = name, "received shutdown signal");
        name
    }
}
