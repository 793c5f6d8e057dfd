use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

use opstd_env_validator::{
    database_schema, resolve_app_mode, resolve_node_env, EnvError, EnvFileLoader, EnvStore,
    EnvValidator, EnvValidatorOptions, FieldSpec, LoadReport, Schema, ValidatedEnv,
    ValidationError,
};

/// Output format of the `print` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PrintFormat {
    /// `KEY=value` lines
    #[default]
    Dotenv,
    /// One JSON object
    Json,
}

/// Extension schema for the `--database` and `--require` flags
pub fn build_schema(database: bool, required: &[String]) -> Option<Schema> {
    let mut schema = if database {
        database_schema()
    } else {
        Schema::new()
    };

    for key in required {
        schema = schema.field(FieldSpec::string(key.as_str()).min_len(1));
    }

    (!schema.is_empty()).then_some(schema)
}

/// Result of one validation run
#[derive(Debug)]
pub enum CheckOutcome {
    Passed { env: ValidatedEnv, load: LoadReport },
    Failed(ValidationError),
}

/// Validate `store` once. Schema failures come back as
/// [`CheckOutcome::Failed`]; any other error aborts.
pub fn check<S: EnvStore>(
    store: S,
    schema: Option<Schema>,
    options: EnvValidatorOptions,
) -> Result<CheckOutcome> {
    match EnvValidator::with_store(store, schema, options) {
        Ok(validator) => Ok(CheckOutcome::Passed {
            env: validator.env()?.clone(),
            load: validator.last_load().clone(),
        }),
        Err(EnvError::Validation(error)) => Ok(CheckOutcome::Failed(error)),
        Err(e) => Err(e).context("环境校验失败"),
    }
}

pub fn render_summary(env: &ValidatedEnv, load: &LoadReport) -> String {
    let mut out = format!(
        "OK: {} keys validated (APP_MODE={}, NODE_ENV={})",
        env.len(),
        env.get_str("APP_MODE").unwrap_or("-"),
        env.get_str("NODE_ENV").unwrap_or("-"),
    );
    for path in load.loaded_paths() {
        let _ = write!(out, "\nloaded: {}", path.display());
    }
    for tier in load.skipped() {
        let _ = write!(out, "\n{tier}");
    }
    out
}

pub fn render_failure(error: &ValidationError) -> String {
    format!("Environment validation failed:\n{}", error.report())
}

pub fn render_env(env: &ValidatedEnv, format: PrintFormat) -> Result<String> {
    match format {
        PrintFormat::Json => serde_json::to_string_pretty(env).context("序列化环境变量失败"),
        PrintFormat::Dotenv => Ok(env
            .to_env_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", dotenv_value(&value)))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Quote values a dotenv reader would otherwise split or strip
fn dotenv_value(value: &str) -> String {
    let plain = !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if plain {
        return value.to_string();
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

/// Tier files in precedence order, lowest first, with an exists flag
pub fn tier_listing<S: EnvStore>(store: &S, options: &EnvValidatorOptions) -> Vec<(PathBuf, bool)> {
    let loader = EnvFileLoader::for_env_path(&options.resolved_env_path());
    let app_mode = resolve_app_mode(store, &options.service_prefix, options.app_mode);
    let node_env = resolve_node_env(store, &options.service_prefix);

    loader
        .tier_paths(node_env, app_mode)
        .into_iter()
        .map(|path| {
            let exists = path.is_file();
            (path, exists)
        })
        .collect()
}

pub fn render_tiers(tiers: &[(PathBuf, bool)]) -> String {
    tiers
        .iter()
        .map(|(path, exists)| {
            let marker = if *exists { "exists" } else { "missing" };
            format!("[{marker}] {}", path.display())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use opstd_env_validator::{AppMode, MemoryEnv};
    use std::fs;
    use tempfile::TempDir;

    fn options_in(dir: &TempDir) -> EnvValidatorOptions {
        EnvValidatorOptions::new().with_env_path(dir.path().join(".env"))
    }

    #[test]
    fn test_build_schema() {
        assert!(build_schema(false, &[]).is_none());

        let schema = build_schema(true, &["API_KEY".to_string()]).unwrap();
        assert!(schema.contains("DATABASE_URL"));
        assert!(schema.contains("API_KEY"));
    }

    #[test]
    fn test_check_passes_with_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "API_KEY=abc\n").unwrap();
        let schema = build_schema(false, &["API_KEY".to_string()]);

        match check(MemoryEnv::new(), schema, options_in(&dir)).unwrap() {
            CheckOutcome::Passed { env, load } => {
                assert_eq!(env.get_str("API_KEY"), Some("abc"));
                let summary = render_summary(&env, &load);
                assert!(summary.starts_with("OK: 4 keys validated"));
                assert!(summary.contains("APP_MODE=development"));
                assert!(summary.contains("loaded: "));
            }
            CheckOutcome::Failed(error) => panic!("unexpected failure: {error}"),
        }
    }

    #[test]
    fn test_check_reports_missing_key() {
        let dir = TempDir::new().unwrap();
        let schema = build_schema(false, &["API_KEY".to_string()]);

        match check(MemoryEnv::new(), schema, options_in(&dir)).unwrap() {
            CheckOutcome::Failed(error) => {
                let report = render_failure(&error);
                assert!(report.contains("API_KEY: Required"));
            }
            CheckOutcome::Passed { .. } => panic!("check should fail"),
        }
    }

    #[test]
    fn test_check_aborts_on_bad_database_url() {
        let dir = TempDir::new().unwrap();
        let store = MemoryEnv::new().with_var("DATABASE_URL", "postgres:orders");

        assert!(check(store, build_schema(true, &[]), options_in(&dir)).is_err());
    }

    #[test]
    fn test_render_env_formats() {
        let env: ValidatedEnv = serde_json::from_value(serde_json::json!({
            "APP_NAME": "Orders API",
            "DB_PORT": 5432,
            "NODE_ENV": "production",
        }))
        .unwrap();

        let dotenv = render_env(&env, PrintFormat::Dotenv).unwrap();
        assert_eq!(
            dotenv,
            "APP_NAME=\"Orders API\"\nDB_PORT=5432\nNODE_ENV=production"
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_env(&env, PrintFormat::Json).unwrap()).unwrap();
        assert_eq!(json["DB_PORT"], 5432);
    }

    #[test]
    fn test_tier_listing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "A=1\n").unwrap();
        fs::write(dir.path().join(".env.staging.local"), "A=2\n").unwrap();
        let store = MemoryEnv::new().with_var("NODE_ENV", "production");
        let options = options_in(&dir).with_app_mode(AppMode::Staging);

        let tiers = tier_listing(&store, &options);
        let names: Vec<String> = tiers
            .iter()
            .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                ".env",
                ".env.production",
                ".env.staging",
                ".env.local",
                ".env.production.local",
                ".env.staging.local",
            ]
        );
        assert!(tiers[0].1);
        assert!(!tiers[1].1);
        assert!(tiers[5].1);

        let rendered = render_tiers(&tiers);
        assert!(rendered.starts_with("[exists] "));
        assert_eq!(rendered.lines().count(), 6);
    }

    #[test]
    fn test_tier_listing_honors_prefixed_mode() {
        let dir = TempDir::new().unwrap();
        let store = MemoryEnv::new().with_var("AUTH_APP_MODE", "test");
        let options = options_in(&dir).with_service_prefix("AUTH_");

        let tiers = tier_listing(&store, &options);

        assert!(tiers.iter().any(|(path, _)| path.ends_with(".env.test.local")));
    }
}
