//! Network layer: listener supervision and TLS.
//!
//! ```text
//! start(config, router)
//!     → tls.rs (optional certificate load, before bind)
//!     → listener.rs (synchronous bind, serve loop on its own task)
//!     → ListenerHandle: Starting → Serving → ShuttingDown → Stopped
//! ```

pub mod listener;
pub mod tls;

pub use listener::{ListenerError, ListenerHandle, ListenerState, ServeError, ShutdownOutcome};
