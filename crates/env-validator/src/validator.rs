use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::loader::{EnvFileLoader, LoadReport};
use crate::mode::{AppMode, NodeEnv};
use crate::normalizer::Normalizer;
use crate::options::EnvValidatorOptions;
use crate::schema::{base_schema, Schema, APP_MODE, NODE_ENV};
use crate::store::{EnvStore, ProcessEnv};
use crate::validation::ValidationErrorHandler;
use crate::{EnvError, EnvResult, ValidatedEnv, ValidationError};

/// Entry point services construct at startup.
///
/// Construction merges the extension schema onto the base schema, loads the
/// env tiers and runs a first validation pass. Every later [`validate`]
/// call reloads the tiers and replaces the stored env wholesale on success.
///
/// The tier selectors (`NODE_ENV`, `APP_MODE`) and the set of ambient keys
/// are fixed at construction, so repeated passes over unchanged files give
/// the same result. Keys the validator itself wrote to the store (file
/// values and write-back of non-ambient keys) are cleared at the start of
/// each pass; only ambient keys carry over between passes.
///
/// [`validate`]: EnvValidator::validate
pub struct EnvValidator<S: EnvStore = ProcessEnv> {
    schema: Schema,
    options: EnvValidatorOptions,
    env_path: PathBuf,
    app_mode: AppMode,
    node_env: Option<NodeEnv>,
    store: S,
    ambient: BTreeSet<String>,
    managed: BTreeSet<String>,
    loader: EnvFileLoader,
    normalizer: Normalizer,
    validated: Option<ValidatedEnv>,
    last_load: LoadReport,
}

impl EnvValidator<ProcessEnv> {
    /// Validator over the process environment
    pub fn new(schema: Option<Schema>, options: EnvValidatorOptions) -> EnvResult<Self> {
        Self::with_store(ProcessEnv, schema, options)
    }
}

impl<S: EnvStore> EnvValidator<S> {
    /// Validator over an explicit store.
    ///
    /// Fails only when the first pass fails under the default handler, or
    /// a schema transform rejects the input.
    pub fn with_store(
        store: S,
        schema: Option<Schema>,
        options: EnvValidatorOptions,
    ) -> EnvResult<Self> {
        let schema = match schema {
            Some(extension) => base_schema().merge(extension),
            None => base_schema(),
        };

        let app_mode = resolve_app_mode(&store, &options.service_prefix, options.app_mode);
        let node_env = resolve_node_env(&store, &options.service_prefix);
        let env_path = options.resolved_env_path();
        let ambient: BTreeSet<String> = store.vars().into_iter().map(|(key, _)| key).collect();

        let loader = EnvFileLoader::for_env_path(&env_path).with_debug(options.debug);
        let normalizer = Normalizer::new(&options.service_prefix, app_mode);

        let mut validator = Self {
            schema,
            options,
            env_path,
            app_mode,
            node_env,
            store,
            ambient,
            managed: BTreeSet::new(),
            loader,
            normalizer,
            validated: None,
            last_load: LoadReport::default(),
        };

        validator.debug_log(&format!(
            "Initial configuration: env_path={}, app_mode={}, node_env={}, service_prefix={:?}, schema_keys={:?}",
            validator.env_path.display(),
            validator.app_mode,
            validator
                .node_env
                .map(|env| env.to_string())
                .unwrap_or_else(|| "invalid".to_string()),
            validator.normalizer.prefix().unwrap_or_default(),
            validator.schema.field_names(),
        ));

        validator.validate()?;
        Ok(validator)
    }

    /// Load tiers, normalize, validate.
    ///
    /// On success every validated key is written back to the store. On a
    /// schema failure the configured handler decides: `Fail` returns the
    /// error, `Custom` returns an empty env and keeps the previous result.
    pub fn validate(&mut self) -> EnvResult<ValidatedEnv> {
        for key in std::mem::take(&mut self.managed) {
            self.store.unset(&key);
        }

        self.last_load = self.loader.load_into(
            &mut self.store,
            &self.ambient,
            self.node_env,
            self.app_mode,
        );
        self.managed.extend(self.last_load.applied.iter().cloned());

        let input = self.normalizer.normalize(&self.store.vars());

        match self.schema.parse(&input) {
            Ok(env) => {
                for (key, value) in env.to_env_pairs() {
                    self.store.set(&key, &value);
                    if !self.ambient.contains(&key) {
                        self.managed.insert(key);
                    }
                }
                self.debug_log(&format!("Validated {} env keys", env.len()));
                self.validated = Some(env.clone());
                Ok(env)
            }
            Err(EnvError::Validation(validation_error)) => {
                self.handle_validation_error(validation_error)
            }
            Err(e) => {
                error!("Environment validation aborted: {e}");
                Err(e)
            }
        }
    }

    fn handle_validation_error(&self, validation_error: ValidationError) -> EnvResult<ValidatedEnv> {
        self.debug_log(&format!("Full error: {:?}", validation_error.issues));

        match &self.options.on_validation_error {
            ValidationErrorHandler::Custom(handler) => {
                handler(&validation_error);
                Ok(ValidatedEnv::empty())
            }
            ValidationErrorHandler::Fail => {
                error!(
                    "Environment validation error: {}",
                    validation_error.report()
                );
                Err(EnvError::Validation(validation_error))
            }
        }
    }

    /// Validated env of the last successful pass
    pub fn env(&self) -> EnvResult<&ValidatedEnv> {
        self.validated.as_ref().ok_or(EnvError::NotValidated)
    }

    pub fn is_validated(&self) -> bool {
        self.validated.is_some()
    }

    /// Active mode: the validated `APP_MODE`, else the mode resolved at
    /// construction
    pub fn app_mode(&self) -> AppMode {
        self.validated
            .as_ref()
            .and_then(|env| env.app_mode().ok())
            .unwrap_or(self.app_mode)
    }

    /// Compare the active mode with a mode name; unknown names never match
    pub fn is_app_mode(&self, candidate: &str) -> bool {
        candidate
            .parse::<AppMode>()
            .is_ok_and(|mode| mode == self.app_mode())
    }

    pub fn is_mode(&self, mode: AppMode) -> bool {
        self.app_mode() == mode
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &EnvValidatorOptions {
        &self.options
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    /// Tier report of the most recent pass
    pub fn last_load(&self) -> &LoadReport {
        &self.last_load
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn debug_log(&self, message: &str) {
        if self.options.debug {
            debug!("[EnvValidator Debug] {message}");
        }
    }
}

/// Mode used to select env tiers: the store's `APP_MODE` (the prefixed form
/// winning, as in normalization), else `fallback`, else development. An
/// unparsable store value is logged and ignored.
pub fn resolve_app_mode<S: EnvStore>(
    store: &S,
    service_prefix: &str,
    fallback: Option<AppMode>,
) -> AppMode {
    match selector(store, service_prefix, APP_MODE) {
        Some(raw) => match raw.parse() {
            Ok(mode) => mode,
            Err(e) => {
                warn!("{e}, selecting env files for the fallback mode");
                fallback.unwrap_or_default()
            }
        },
        None => fallback.unwrap_or_default(),
    }
}

/// `NODE_ENV` tier selector; `None` when the store holds an unknown value
pub fn resolve_node_env<S: EnvStore>(store: &S, service_prefix: &str) -> Option<NodeEnv> {
    match selector(store, service_prefix, NODE_ENV) {
        Some(raw) => raw.parse().ok(),
        None => Some(NodeEnv::default()),
    }
}

fn selector<S: EnvStore>(store: &S, service_prefix: &str, key: &str) -> Option<String> {
    Normalizer::new(service_prefix, AppMode::default()).resolve(&store.vars(), key)
}
