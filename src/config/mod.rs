//! Configuration management.
//!
//! ```text
//! settings file (YAML)
//!     → loader.rs (parse, validate, merge CLI overrides)
//!     → ServiceConfig (validated, immutable)
//!     → passed by reference to every subsystem
//! ```
//!
//! There is no ambient configuration state: the snapshot is built once at
//! startup and read-only afterwards.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{Mode, ServiceConfig};
