use thiserror::Error;

/// Logger configuration and setup errors
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    #[error("Logger configuration error: {0}")]
    InvalidConfig(String),

    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}
