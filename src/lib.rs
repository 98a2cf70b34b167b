//! Admin API server lifecycle.
//!
//! Sequences subsystem initialization, serves HTTP(S) on a supervised
//! background task, and coordinates signal-triggered graceful shutdown.
//!
//! ```text
//! Startup:   config → logging → storage → policy   (ordered, fail-fast)
//! Serving:   bind (synchronous) → accept loop on its own task
//! Shutdown:  interrupt → Draining (bounded) → Stopped → release storage
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod net;

// Opaque collaborators
pub mod auth;
pub mod storage;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
