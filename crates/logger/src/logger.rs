use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::config::{LogLevel, LoggerConfig};

/// One serialized log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub service: String,
    pub environment: String,
    pub msg: String,
    /// Milliseconds since the Unix epoch
    pub time: i64,
}

impl LogEntry {
    pub fn new(config: &LoggerConfig, level: LogLevel, msg: &str) -> Self {
        Self {
            level: level.entry_label(),
            service: config.service_name.clone(),
            environment: config.environment.clone(),
            msg: msg.to_string(),
            time: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Service logger.
///
/// Each call emits a `tracing` event carrying the service metadata and
/// returns the JSON form of the entry, whether or not the level is enabled.
#[derive(Debug, Clone)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    /// Build a logger, falling back to the default configuration when
    /// `config` is invalid
    pub fn new(config: LoggerConfig) -> Self {
        match config.validate() {
            Ok(()) => Self { config },
            Err(e) => {
                eprintln!("Logger configuration error: {e}");
                Self {
                    config: LoggerConfig::default(),
                }
            }
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn level(&self) -> LogLevel {
        self.config.log_level
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.config.log_level
    }

    pub fn debug(&self, msg: &str) -> String {
        self.log(LogLevel::Debug, msg)
    }

    pub fn info(&self, msg: &str) -> String {
        self.log(LogLevel::Info, msg)
    }

    pub fn warn(&self, msg: &str) -> String {
        self.log(LogLevel::Warn, msg)
    }

    pub fn error(&self, msg: &str) -> String {
        self.log(LogLevel::Error, msg)
    }

    pub fn log(&self, level: LogLevel, msg: &str) -> String {
        let entry = LogEntry::new(&self.config, level, msg);
        if self.is_enabled(level) {
            self.emit(&entry, level);
        }
        entry
            .to_json()
            .unwrap_or_else(|_| "Invalid log entry".to_string())
    }

    fn emit(&self, entry: &LogEntry, level: LogLevel) {
        let service = entry.service.as_str();
        let environment = entry.environment.as_str();
        let msg = entry.msg.as_str();
        match level {
            LogLevel::Trace => trace!(service, environment, "{msg}"),
            LogLevel::Debug => debug!(service, environment, "{msg}"),
            LogLevel::Info => info!(service, environment, "{msg}"),
            LogLevel::Warn => warn!(service, environment, "{msg}"),
            LogLevel::Error => error!(service, environment, "{msg}"),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}
