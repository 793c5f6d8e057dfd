use std::path::PathBuf;

use crate::mode::AppMode;
use crate::validation::ValidationErrorHandler;
use crate::ValidationError;

/// Construction options for [`crate::EnvValidator`].
///
/// Every field is optional; unset fields fall back to their defaults.
#[derive(Debug, Clone, Default)]
pub struct EnvValidatorOptions {
    /// Path of the base `.env` file, tiers are looked up next to it.
    /// Defaults to `<cwd>/.env`.
    pub env_path: Option<PathBuf>,
    /// Namespace stripped from variable names, e.g. `AUTH_`
    pub service_prefix: String,
    /// Emit debug events about loading and validation
    pub debug: bool,
    /// Mode used when the store has no `APP_MODE`
    pub app_mode: Option<AppMode>,
    pub on_validation_error: ValidationErrorHandler,
}

impl EnvValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_path(mut self, env_path: impl Into<PathBuf>) -> Self {
        self.env_path = Some(env_path.into());
        self
    }

    pub fn with_service_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.service_prefix = prefix.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_app_mode(mut self, mode: AppMode) -> Self {
        self.app_mode = Some(mode);
        self
    }

    pub fn on_validation_error(mut self, handler: ValidationErrorHandler) -> Self {
        self.on_validation_error = handler;
        self
    }

    /// Shorthand for a [`ValidationErrorHandler::Custom`] handler
    pub fn with_error_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&ValidationError) + Send + Sync + 'static,
    {
        self.on_validation_error(ValidationErrorHandler::custom(handler))
    }

    /// `env_path`, or `.env` in the working directory
    pub fn resolved_env_path(&self) -> PathBuf {
        self.env_path.clone().unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".env")
        })
    }
}
