//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the settings file.
//! The snapshot is immutable once loaded; CLI overrides are merged by the
//! loader before any subsystem sees it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener and runtime-mode settings.
    pub application: ApplicationConfig,

    /// Persistent storage connection settings.
    pub database: DatabaseConfig,

    /// Authorization policy engine settings.
    pub authorization: AuthorizationConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Application-level settings: where and how the server listens.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Host or interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Runtime mode; selects the log format among other things.
    pub mode: Mode,

    /// Optional TLS termination.
    pub ssl: SslConfig,
}

impl ApplicationConfig {
    /// The `host:port` string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            mode: Mode::Dev,
            ssl: SslConfig::default(),
        }
    }
}

/// Runtime mode of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Test,
    Prod,
}

/// TLS settings for the listener.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SslConfig {
    /// Serve HTTPS instead of plain HTTP.
    pub enabled: bool,

    /// Path to the certificate file (PEM).
    pub cert_path: String,

    /// Path to the private key file (PEM).
    pub key_path: String,
}

/// Persistent storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Storage driver name. Only "sqlite3" is supported.
    pub driver: String,

    /// Driver-specific connection source (file path for sqlite3).
    pub source: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite3".to_string(),
            source: "data/admin.db".to_string(),
        }
    }
}

/// Authorization policy engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Path to the policy rule file.
    pub policy_path: String,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            policy_path: "config/policy.csv".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
