use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogLevel, LoggerConfig, OutputFormat};
use crate::LoggerError;

/// `RUST_LOG` when set, otherwise the configured level
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}

/// Install the global subscriber.
///
/// Events go to stderr. Fails when a global subscriber is already set.
pub fn init_subscriber(config: &LoggerConfig, format: OutputFormat) -> Result<(), LoggerError> {
    let registry = tracing_subscriber::registry().with(build_filter(config.log_level));

    let result = match format {
        OutputFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        OutputFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        OutputFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| LoggerError::Init(e.to_string()))
}
