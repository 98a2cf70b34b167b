//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, merging CLI overrides
//! - Initialize subsystems in dependency order
//! - Hand the owned resources to the serve phase
//!
//! # Design Decisions
//! - Fail fast: the first initializer error aborts startup, and the
//!   listener is never bound after a failure
//! - Subsystems initialize in order, not concurrently
//! - No retries at this layer; an initializer that wants them retries
//!   internally

use std::path::PathBuf;

use thiserror::Error;

use crate::auth::{PolicyEngine, PolicyError};
use crate::config::loader::{self, ConfigError};
use crate::config::schema::{Mode, ServiceConfig};
use crate::observability::logging;
use crate::storage::{Database, StorageError};

/// Error type for startup. The variant records which initializer failed.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("authorization policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Options for the `server` subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct ServerOptions {
    /// Path to the settings file.
    #[arg(short, long, default_value = "config/settings.yml")]
    pub config: PathBuf,

    /// Override the TCP port the server listens on (settings default: 8000).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server mode (settings default: dev).
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,
}

/// Resources owned by a fully initialized service, alive until shutdown.
pub struct App {
    pub config: ServiceConfig,
    pub db: Database,
    pub policy: PolicyEngine,
}

/// Run the subsystem initializers in fixed order: configuration, logging,
/// storage connection, authorization policy.
pub fn initialize(opts: &ServerOptions) -> Result<App, StartupError> {
    let config = loader::load_config(&opts.config)?;
    let config = loader::apply_overrides(config, opts.port, opts.mode);

    logging::init(config.application.mode, &config.logging.level);
    tracing::info!(
        config = %opts.config.display(),
        mode = ?config.application.mode,
        "starting api server"
    );

    let db = Database::connect(&config.database)?;
    let policy = PolicyEngine::setup(&config.authorization)?;

    Ok(App { config, db, policy })
}
