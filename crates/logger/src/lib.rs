//! Structured logging for OPSTD services.
//!
//! [`init_subscriber`] installs the process-wide `tracing` subscriber;
//! [`Logger`] stamps service metadata on each entry and hands back the
//! serialized line.

pub mod config;
pub mod errors;
pub mod logger;
pub mod subscriber;

pub use config::{LogLevel, LoggerConfig, OutputFormat, DEFAULT_ENVIRONMENT, DEFAULT_SERVICE_NAME};
pub use errors::LoggerError;
pub use logger::{LogEntry, Logger};
pub use subscriber::{build_filter, init_subscriber};
