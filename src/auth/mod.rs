//! Authorization policy engine.
//!
//! Loads a rule file of `p, subject, object, action` lines at startup and
//! answers `enforce` queries. Policy *evaluation* placement (middleware,
//! handlers) is outside this fragment; the lifecycle only guarantees the
//! engine is ready before the listener starts.

use std::fs;

use thiserror::Error;

use crate::config::schema::AuthorizationConfig;

/// Error type for policy engine setup.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Failed to read the policy file.
    #[error("failed to read policy file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// A rule line did not have the `p, sub, obj, act` shape.
    #[error("malformed policy rule at line {line}: '{rule}'")]
    Malformed { line: usize, rule: String },
}

#[derive(Debug, Clone)]
struct PolicyRule {
    subject: String,
    object: String,
    action: String,
}

/// In-memory authorization policy, immutable after setup.
pub struct PolicyEngine {
    rules: Vec<PolicyRule>,
}

impl PolicyEngine {
    /// Load the policy rule file. Blank lines and `#` comments are skipped;
    /// anything else must parse or setup fails.
    pub fn setup(config: &AuthorizationConfig) -> Result<Self, PolicyError> {
        let content = fs::read_to_string(&config.policy_path).map_err(|e| PolicyError::Read {
            path: config.policy_path.clone(),
            source: e,
        })?;

        let mut rules = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            match fields.as_slice() {
                ["p", subject, object, action] => rules.push(PolicyRule {
                    subject: subject.to_string(),
                    object: object.to_string(),
                    action: action.to_string(),
                }),
                _ => {
                    return Err(PolicyError::Malformed {
                        line: idx + 1,
                        rule: line.to_string(),
                    })
                }
            }
        }

        tracing::info!(
            rules = rules.len(),
            path = %config.policy_path,
            "authorization policy loaded"
        );

        Ok(Self { rules })
    }

    /// Check whether `subject` may perform `action` on `object`.
    pub fn enforce(&self, subject: &str, object: &str, action: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.subject == subject
                && matches_pattern(&rule.object, object)
                && matches_pattern(&rule.action, action)
        })
    }

    /// Number of loaded rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Exact match, or prefix match when the pattern ends in `*`.
fn matches_pattern(pattern: &str, value: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}
