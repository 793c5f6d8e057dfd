use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use opstd_env_validator::{AppMode, EnvValidatorOptions};
use opstd_logger::{LogLevel, OutputFormat};

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "opstd-env.toml";

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "OPSTD_ENV";

/// Settings of the `opstd-env` tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliSettings {
    /// Base `.env` path; tiers are resolved next to it
    pub env_path: Option<PathBuf>,
    pub service_prefix: String,
    pub app_mode: Option<String>,
    pub debug: bool,
    pub log_level: String,
    pub log_format: String,
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub env_path: Option<PathBuf>,
    pub service_prefix: Option<String>,
    pub app_mode: Option<String>,
    pub debug: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl CliSettings {
    /// Load settings: defaults, settings file, `OPSTD_ENV_*` variables,
    /// command-line overrides
    pub fn load(config_path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        Self::load_from(
            config_path,
            overrides,
            Environment::with_prefix(ENV_PREFIX),
        )
    }

    pub fn load_from(
        config_path: Option<&Path>,
        overrides: &SettingsOverrides,
        environment: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("service_prefix", "")?
            .set_default("debug", false)?
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?;

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow::anyhow!("配置文件不存在: {}", path.display()));
                }
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                if Path::new(DEFAULT_SETTINGS_FILE).exists() {
                    builder =
                        builder.add_source(File::new(DEFAULT_SETTINGS_FILE, FileFormat::Toml));
                }
            }
        }

        builder = builder
            .add_source(environment)
            .set_override_option(
                "env_path",
                overrides
                    .env_path
                    .as_ref()
                    .map(|path| path.display().to_string()),
            )?
            .set_override_option("service_prefix", overrides.service_prefix.clone())?
            .set_override_option("app_mode", overrides.app_mode.clone())?
            .set_override_option("debug", overrides.debug.then_some(true))?
            .set_override_option("log_level", overrides.log_level.clone())?
            .set_override_option("log_format", overrides.log_format.clone())?;

        let settings: CliSettings = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject unknown mode, level and format names
    pub fn validate(&self) -> Result<()> {
        self.parsed_app_mode()?;
        self.parsed_log_level()?;
        self.parsed_log_format()?;
        Ok(())
    }

    pub fn parsed_app_mode(&self) -> Result<Option<AppMode>> {
        self.app_mode
            .as_deref()
            .filter(|mode| !mode.trim().is_empty())
            .map(|mode| mode.parse::<AppMode>())
            .transpose()
            .context("app_mode 配置无效")
    }

    pub fn parsed_log_level(&self) -> Result<LogLevel> {
        self.log_level
            .parse()
            .with_context(|| format!("log_level 配置无效: {}", self.log_level))
    }

    pub fn parsed_log_format(&self) -> Result<OutputFormat> {
        self.log_format
            .parse()
            .with_context(|| format!("log_format 配置无效: {}", self.log_format))
    }

    /// Validator options described by these settings
    pub fn validator_options(&self) -> Result<EnvValidatorOptions> {
        let mut options = EnvValidatorOptions::new()
            .with_service_prefix(self.service_prefix.clone())
            .with_debug(self.debug);

        if let Some(env_path) = &self.env_path {
            options = options.with_env_path(env_path.clone());
        }
        if let Some(mode) = self.parsed_app_mode()? {
            options = options.with_app_mode(mode);
        }

        Ok(options)
    }
}
