//! Shutdown coordination.
//!
//! State machine: `Running -> Draining -> Stopped`. The transition out of
//! `Running` fires exactly once, on the first shutdown signal; the watch
//! channel absorbs any later signals. `Stopped` is terminal and is reached
//! whether the drain finished gracefully or was forced at the deadline.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::net::listener::{ListenerHandle, ServeError, ShutdownOutcome};

/// Time allowed for in-flight requests to finish before the stop is forced.
pub const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(5);

/// Coordinator state, observable through `watch_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Serving; blocked waiting for the shutdown signal.
    Running,
    /// Signal received; listener draining within the deadline.
    Draining,
    /// Terminal.
    Stopped,
}

/// Fatal conditions surfaced while coordinating shutdown.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The serve loop died before any shutdown was requested.
    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Drives the listener from `Serving` to `Stopped`.
pub struct ShutdownCoordinator {
    state_tx: watch::Sender<CoordinatorState>,
    deadline: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator with the given drain deadline.
    ///
    /// Production uses [`SHUTDOWN_DEADLINE`]; tests pass shorter values.
    pub fn new(deadline: Duration) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::Running);
        Self { state_tx, deadline }
    }

    /// Current coordinator state.
    pub fn state(&self) -> CoordinatorState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state transitions.
    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.state_tx.subscribe()
    }

    /// Block in `Running` until the shutdown signal fires, then drain the
    /// listener. An unexpected serve-loop exit while waiting is fatal and
    /// short-circuits with an error.
    ///
    /// Returns the drain outcome; escalating a forced outcome is the
    /// caller's decision, made after resources are released.
    pub async fn run(
        self,
        mut handle: ListenerHandle,
        mut signal: watch::Receiver<bool>,
    ) -> Result<ShutdownOutcome, ShutdownError> {
        tokio::select! {
            // A dropped signal sender means no interrupt can ever arrive;
            // draining immediately is the only sensible response.
            _ = signal.changed() => {}
            err = handle.serve_exited() => {
                let _ = self.state_tx.send(CoordinatorState::Stopped);
                return Err(err.into());
            }
        }

        let _ = self.state_tx.send(CoordinatorState::Draining);
        tracing::info!(deadline = ?self.deadline, "shutting down, draining connections");

        let outcome = handle.shutdown(self.deadline).await;
        let _ = self.state_tx.send(CoordinatorState::Stopped);

        match outcome {
            ShutdownOutcome::Graceful => tracing::info!("graceful shutdown complete"),
            ShutdownOutcome::Forced => tracing::error!(
                deadline = ?self.deadline,
                "shutdown deadline elapsed, remaining connections aborted"
            ),
        }

        Ok(outcome)
    }
}
