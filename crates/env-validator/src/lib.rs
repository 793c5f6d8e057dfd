//! Layered `.env` loading and schema validation for OPSTD services.
//!
//! A service builds one [`EnvValidator`] at startup, optionally extending the
//! base schema, and reads typed values from [`EnvValidator::env`]:
//!
//! ```rust,no_run
//! use opstd_env_validator::{database_schema, DatabaseEnv, EnvValidator, EnvValidatorOptions};
//!
//! let validator = EnvValidator::new(
//!     Some(database_schema()),
//!     EnvValidatorOptions::new().with_service_prefix("DB_SERVICE_"),
//! )?;
//!
//! let db = DatabaseEnv::from_env(validator.env()?)?;
//! println!("connecting to {}:{}", db.host, db.port);
//! # Ok::<(), opstd_env_validator::EnvError>(())
//! ```

pub mod errors;
pub mod loader;
pub mod mode;
pub mod normalizer;
pub mod options;
pub mod schema;
pub mod store;
pub mod validated;
pub mod validation;
pub mod validator;

pub use errors::{EnvError, EnvResult, ValidationError, ValidationIssue};
pub use loader::{tier_files, EnvFileLoader, LoadReport, TierReport, TierStatus};
pub use mode::{AppMode, NodeEnv};
pub use normalizer::Normalizer;
pub use options::EnvValidatorOptions;
pub use schema::{
    base_schema, database_schema, DatabaseEnv, FieldKind, FieldSpec, Presence, Schema,
};
pub use store::{EnvStore, MemoryEnv, ProcessEnv};
pub use validated::ValidatedEnv;
pub use validation::{ValidationErrorCallback, ValidationErrorHandler};
pub use validator::{resolve_app_mode, resolve_node_env, EnvValidator};
