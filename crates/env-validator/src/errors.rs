use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failing field reported by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path (the variable name for flat env schemas)
    pub path: String,
    /// Human readable reason
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Structured schema failure, one issue per failing field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Failing field paths in report order
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.path.as_str()).collect()
    }

    /// Multi-line `path: message` report
    pub fn report(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised by the environment validator
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Environment validation error:\n{0}")]
    Validation(ValidationError),

    #[error("Env not validated yet. Call validate() first.")]
    NotValidated,

    #[error("Invalid DATABASE_URL format: {0}")]
    UrlComposition(String),

    #[error("Invalid {kind}: {value}")]
    InvalidMode { kind: &'static str, value: String },

    #[error("Failed to read {key} as {expected}: {message}")]
    Access {
        key: String,
        expected: &'static str,
        message: String,
    },

    #[error("Failed to deserialize validated env: {0}")]
    Deserialize(#[from] serde_json::Error),
}

pub type EnvResult<T> = std::result::Result<T, EnvError>;
