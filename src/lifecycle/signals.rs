//! OS signal handling.

use tokio::sync::watch;

/// Bridges OS interrupt signals to an in-process notification channel.
///
/// Created before the serve loop starts and consumed exactly once by the
/// shutdown coordinator. `notify` lets tests and programmatic callers raise
/// the signal without delivering a real interrupt.
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// Create the signal channel. Nothing is raised yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Get a receiver that resolves when the signal is raised.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Spawn the background task that waits for an OS interrupt and raises
    /// the signal once.
    pub fn listen(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let name = interrupt().await;
            tracing::info!(signal = name, "shutdown signal received");
            let _ = tx.send(true);
        });
    }

    /// Raise the signal programmatically.
    pub fn notify(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether the signal has been raised.
    pub fn is_raised(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for an interrupt. Returns the name of the signal received.
#[cfg(unix)]
async fn interrupt() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn interrupt() -> &'static str {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to register Ctrl+C handler");
    "Ctrl+C"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_wakes_subscriber() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();

        assert!(!signal.is_raised());
        signal.notify();

        rx.changed().await.unwrap();
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn all_subscribers_observe_the_signal() {
        let signal = ShutdownSignal::new();
        let mut rx1 = signal.subscribe();
        let mut rx2 = signal.subscribe();

        signal.notify();

        rx1.changed().await.unwrap();
        rx2.changed().await.unwrap();
        assert!(*rx1.borrow());
        assert!(*rx2.borrow());
    }

    #[tokio::test]
    async fn repeated_notify_coalesces() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();

        signal.notify();
        signal.notify();

        // The watch channel holds a single value; both raises collapse into
        // one observable change.
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}
