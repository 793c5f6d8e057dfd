use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::mode::{AppMode, NodeEnv};
use crate::store::EnvStore;

pub const BASE_ENV_FILE: &str = ".env";

/// Tier file names, lowest precedence first.
///
/// `.env`, `.env.<node_env>`, `.env.<mode>`, `.env.local`,
/// `.env.<node_env>.local`, `.env.<mode>.local`. A name that appears twice
/// is kept at its later position only. Without a usable `NODE_ENV` the
/// environment-specific tiers are left out.
pub fn tier_files(node_env: Option<NodeEnv>, app_mode: AppMode) -> Vec<String> {
    let mut names = vec![BASE_ENV_FILE.to_string()];
    if let Some(env) = node_env {
        names.push(format!(".env.{env}"));
    }
    names.push(format!(".env.{app_mode}"));
    names.push(".env.local".to_string());
    if let Some(env) = node_env {
        names.push(format!(".env.{env}.local"));
    }
    names.push(format!(".env.{app_mode}.local"));

    let mut deduped: Vec<String> = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if !names[index + 1..].contains(name) {
            deduped.push(name.clone());
        }
    }
    deduped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierStatus {
    Loaded { vars: usize },
    Missing,
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub path: PathBuf,
    pub status: TierStatus,
}

impl fmt::Display for TierReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            TierStatus::Loaded { vars } => write!(f, "{} (loaded, {vars} vars)", self.path.display()),
            TierStatus::Missing => write!(f, "{} (missing)", self.path.display()),
            TierStatus::Skipped { reason } => {
                write!(f, "{} (skipped: {reason})", self.path.display())
            }
        }
    }
}

/// Outcome of one loading pass, tiers in precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tiers: Vec<TierReport>,
    /// File keys not applied because an ambient variable already held them
    pub shadowed: Vec<String>,
    /// File keys written to the store
    pub applied: Vec<String>,
}

impl LoadReport {
    pub fn loaded_paths(&self) -> Vec<&Path> {
        self.tiers
            .iter()
            .filter(|t| matches!(t.status, TierStatus::Loaded { .. }))
            .map(|t| t.path.as_path())
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &TierReport> {
        self.tiers
            .iter()
            .filter(|t| matches!(t.status, TierStatus::Skipped { .. }))
    }
}

/// Reads tiered dotenv files from one directory
#[derive(Debug, Clone)]
pub struct EnvFileLoader {
    base_dir: PathBuf,
    debug: bool,
}

impl EnvFileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            debug: false,
        }
    }

    /// Loader for the directory containing `env_path`
    pub fn for_env_path(env_path: &Path) -> Self {
        let base_dir = env_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base_dir)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn tier_paths(&self, node_env: Option<NodeEnv>, app_mode: AppMode) -> Vec<PathBuf> {
        tier_files(node_env, app_mode)
            .into_iter()
            .map(|name| self.base_dir.join(name))
            .collect()
    }

    /// Read every existing tier and merge them, later tiers winning
    pub fn read_tiers(
        &self,
        node_env: Option<NodeEnv>,
        app_mode: AppMode,
    ) -> (BTreeMap<String, String>, LoadReport) {
        let mut merged = BTreeMap::new();
        let mut report = LoadReport::default();

        for path in self.tier_paths(node_env, app_mode) {
            let status = if !path.is_file() {
                TierStatus::Missing
            } else {
                match read_tier(&path) {
                    Ok(vars) => {
                        if self.debug {
                            debug!("[EnvValidator Debug] Loading env file: {}", path.display());
                        }
                        let count = vars.len();
                        merged.extend(vars);
                        TierStatus::Loaded { vars: count }
                    }
                    Err(e) => {
                        warn!("Skipping env file {}: {}", path.display(), e);
                        TierStatus::Skipped {
                            reason: e.to_string(),
                        }
                    }
                }
            };
            report.tiers.push(TierReport { path, status });
        }

        (merged, report)
    }

    /// Apply the merged tiers to `store`, leaving `ambient` keys untouched
    pub fn load_into<S: EnvStore>(
        &self,
        store: &mut S,
        ambient: &BTreeSet<String>,
        node_env: Option<NodeEnv>,
        app_mode: AppMode,
    ) -> LoadReport {
        let (merged, mut report) = self.read_tiers(node_env, app_mode);

        for (key, value) in merged {
            if ambient.contains(&key) {
                report.shadowed.push(key);
                continue;
            }
            store.set(&key, &value);
            report.applied.push(key);
        }

        if self.debug && !report.shadowed.is_empty() {
            debug!(
                "[EnvValidator Debug] Kept ambient values for: {}",
                report.shadowed.join(", ")
            );
        }
        report
    }
}

/// A tier is all-or-nothing: one malformed line skips the file.
///
/// `${VAR}` references are expanded by dotenvy, which consults the process
/// environment first and then earlier lines of the same file. The validator's
/// store is not consulted, so a [`crate::MemoryEnv`] run still sees process
/// variables inside substitutions.
fn read_tier(path: &Path) -> Result<Vec<(String, String)>, dotenvy::Error> {
    dotenvy::from_path_iter(path)?.collect()
}
