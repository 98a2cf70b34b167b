//! Observability subsystem.
//!
//! Only structured logging lives here; metrics and distributed tracing are
//! out of scope for this service.

pub mod logging;
