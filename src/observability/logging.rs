//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - JSON format in prod, human-readable format otherwise
//! - Level comes from config, RUST_LOG wins when set
//! - Initialization is idempotent: a second call is a no-op

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::Mode;

/// Initialize the logging subsystem.
///
/// Must run before any other subsystem so their setup steps are observable.
pub fn init(mode: Mode, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match mode {
        Mode::Prod => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        Mode::Dev | Mode::Test => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if result.is_err() {
        // A subscriber is already installed.
        tracing::debug!("logging already initialized, keeping existing subscriber");
    }
}
