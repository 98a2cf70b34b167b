//! Persistent storage connection.
//!
//! The database is an opaque collaborator as far as the lifecycle is
//! concerned: one `connect` at startup, one `close` as the last step before
//! exit. Query-layer code lives elsewhere.

use rusqlite::Connection;
use thiserror::Error;

use crate::config::schema::DatabaseConfig;

/// Error type for storage setup.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Configured driver is not supported by this build.
    #[error("unsupported database driver '{0}'")]
    UnsupportedDriver(String),

    /// Failed to open the database file.
    #[error("failed to open database '{path}': {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    /// Connectivity check after open failed.
    #[error("database connectivity check failed: {0}")]
    Ping(rusqlite::Error),
}

/// An open storage connection, held for the lifetime of the service.
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    /// Open the configured database and verify it answers a trivial query.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        if config.driver != "sqlite3" {
            return Err(StorageError::UnsupportedDriver(config.driver.clone()));
        }

        let conn = Connection::open(&config.source).map_err(|e| StorageError::Open {
            path: config.source.clone(),
            source: e,
        })?;

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(StorageError::Ping)?;

        tracing::info!(path = %config.source, "database connection established");

        Ok(Self {
            conn,
            path: config.source.clone(),
        })
    }

    /// Release the connection. Consumes the handle so it can happen once.
    pub fn close(self) {
        tracing::info!(path = %self.path, "closing database connection");
        if let Err((_conn, err)) = self.conn.close() {
            tracing::warn!(error = %err, "database close reported an error");
        }
    }
}
