//! Service lifecycle.
//!
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging → Connect storage → Load policy
//!
//! Serving (net::listener):
//!     Bind (synchronous) → accept/serve loop on its own task
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Interrupt → stop accepting → drain (≤ deadline) → release storage
//! ```
//!
//! # Design Decisions
//! - Ordered startup: configuration first, listener last
//! - Exactly one shutdown path per process lifetime, signal-triggered
//! - Storage closes strictly after the listener reports `Stopped`, on the
//!   graceful and the forced path alike

pub mod shutdown;
pub mod signals;
pub mod startup;

use thiserror::Error;

use crate::net::listener::{self, ListenerError, ShutdownOutcome};
use shutdown::{ShutdownCoordinator, ShutdownError, SHUTDOWN_DEADLINE};
use signals::ShutdownSignal;
use startup::{initialize, ServerOptions, StartupError};

/// Top-level fatal conditions. All of them terminate the process.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("startup failed: {0}")]
    Startup(#[from] StartupError),

    #[error("listener failed: {0}")]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Shutdown(#[from] ShutdownError),

    #[error("graceful shutdown exceeded {deadline:?}; in-flight requests were aborted")]
    ShutdownTimeout { deadline: std::time::Duration },
}

/// Bring the service up, serve until interrupted, and tear it down.
///
/// A forced drain still releases storage before the error is escalated, so
/// cleanup runs on every exit path that reaches `Serving`.
pub async fn run(opts: ServerOptions) -> Result<(), LifecycleError> {
    let app = initialize(&opts)?;

    let router = crate::http::build_router();
    let handle = listener::start(&app.config, router).await?;

    let signal = ShutdownSignal::new();
    signal.listen();

    let coordinator = ShutdownCoordinator::new(SHUTDOWN_DEADLINE);
    let result = coordinator.run(handle, signal.subscribe()).await;

    // Last step before exit, after the listener reported Stopped.
    app.db.close();

    match result? {
        ShutdownOutcome::Graceful => {
            tracing::info!("server exiting");
            Ok(())
        }
        ShutdownOutcome::Forced => Err(LifecycleError::ShutdownTimeout {
            deadline: SHUTDOWN_DEADLINE,
        }),
    }
}
