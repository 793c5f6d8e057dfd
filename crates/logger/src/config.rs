use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LoggerError;

/// Minimum severity a [`crate::Logger`] emits, ordered from most to least
/// verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(LoggerError::InvalidLevel(level.to_string())),
        }
    }
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// `level` field of a serialized [`crate::LogEntry`]
    pub fn entry_label(&self) -> String {
        self.as_directive().to_ascii_uppercase()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Multi-line human readable output
    Pretty,
    /// Single-line key=value style output
    Compact,
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            "compact" | "logfmt" | "text" => Ok(OutputFormat::Compact),
            _ => Err(LoggerError::InvalidFormat(format.to_string())),
        }
    }
}

pub const DEFAULT_SERVICE_NAME: &str = "opstd-service";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Service name stamped on every entry
    pub service_name: String,
    /// Deployment environment stamped on every entry
    pub environment: String,
    /// Minimum level emitted
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl LoggerConfig {
    pub fn new(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment: environment.into(),
            log_level: LogLevel::Info,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.service_name.trim().is_empty() {
            return Err(LoggerError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        if self.environment.trim().is_empty() {
            return Err(LoggerError::InvalidConfig(
                "environment must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
