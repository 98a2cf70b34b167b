//! Configuration loading from disk.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Mode, ServiceConfig};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error when reading the settings file.
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// YAML parsing error.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    /// Semantic validation failed with one or more errors.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

/// Load and validate configuration from a YAML settings file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let path_str = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    load_config_from_str(&content, &path_str)
}

/// Load and validate configuration from a YAML string.
///
/// Useful for testing or when config is provided via other means.
pub fn load_config_from_str(content: &str, source_name: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: source_name.to_string(),
        source: e,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Merge CLI overrides into a loaded snapshot.
///
/// This is the only place the configuration is written after parsing; the
/// result is frozen before any subsystem sees it.
pub fn apply_overrides(
    mut config: ServiceConfig,
    port: Option<u16>,
    mode: Option<Mode>,
) -> ServiceConfig {
    if let Some(port) = port {
        config.application.port = port;
    }
    if let Some(mode) = mode {
        config.application.mode = mode;
    }
    config
}

/// Semantic validation. Returns all problems, not just the first.
fn validate_config(config: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.application.host.is_empty() {
        errors.push("application.host must not be empty".to_string());
    }

    if config.application.ssl.enabled {
        if config.application.ssl.cert_path.is_empty() {
            errors.push("application.ssl.cert_path is required when ssl is enabled".to_string());
        }
        if config.application.ssl.key_path.is_empty() {
            errors.push("application.ssl.key_path is required when ssl is enabled".to_string());
        }
    }

    if config.database.source.is_empty() {
        errors.push("database.source must not be empty".to_string());
    }

    if config.authorization.policy_path.is_empty() {
        errors.push("authorization.policy_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
application:
  host: "127.0.0.1"
  port: 8000
  mode: dev
  ssl:
    enabled: false

database:
  driver: sqlite3
  source: "./data/admin.db"

authorization:
  policy_path: "./config/policy.csv"

logging:
  level: info
"#;

    #[test]
    fn loads_valid_config() {
        let config = load_config_from_str(VALID_CONFIG, "settings.yml").unwrap();
        assert_eq!(config.application.host, "127.0.0.1");
        assert_eq!(config.application.port, 8000);
        assert_eq!(config.application.mode, Mode::Dev);
        assert_eq!(config.database.source, "./data/admin.db");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = load_config(Path::new("/nonexistent/settings.yml"));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = load_config_from_str("application: [not a mapping", "settings.yml");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn ssl_without_cert_paths_fails_validation() {
        let content = r#"
application:
  ssl:
    enabled: true
"#;
        match load_config_from_str(content, "settings.yml") {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("cert_path"));
                assert!(errors[1].contains("key_path"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn overrides_replace_port_and_mode() {
        let config = load_config_from_str(VALID_CONFIG, "settings.yml").unwrap();
        let config = apply_overrides(config, Some(9000), Some(Mode::Prod));
        assert_eq!(config.application.port, 9000);
        assert_eq!(config.application.mode, Mode::Prod);
    }

    #[test]
    fn overrides_are_optional() {
        let config = load_config_from_str(VALID_CONFIG, "settings.yml").unwrap();
        let config = apply_overrides(config, None, None);
        assert_eq!(config.application.port, 8000);
        assert_eq!(config.application.mode, Mode::Dev);
    }
}
