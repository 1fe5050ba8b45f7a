use thiserror::Error;

use crate::core::rules::Operation;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Guard references unbound variable '{variable}' (pattern '{pattern}')")]
    UnboundVariable { variable: String, pattern: String },

    #[error("Invalid rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("Permission denied: {operation} on '{path}'")]
    PermissionDenied { operation: Operation, path: String },

    #[error("Invalid operation: {0} (expected 'read' or 'write')")]
    InvalidOperation(String),

    #[error("Unsupported rules_version: {0} (only '2' is supported)")]
    UnsupportedVersion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RulesError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        RulesError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        RulesError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;
