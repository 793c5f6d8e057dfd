use crate::mode::{AppMode, NodeEnv};

use super::{FieldSpec, Schema};

pub const NODE_ENV: &str = "NODE_ENV";
pub const APP_MODE: &str = "APP_MODE";
pub const APP_NAME: &str = "APP_NAME";

pub const DEFAULT_APP_NAME: &str = "OPSTD.io";

/// Core keys every service schema carries.
///
/// All three are locked: an extension schema cannot shadow them.
pub fn base_schema() -> Schema {
    Schema::new()
        .field(
            FieldSpec::one_of(NODE_ENV, &NodeEnv::VARIANTS)
                .default_value(NodeEnv::default().as_str())
                .locked(),
        )
        .field(
            FieldSpec::one_of(APP_MODE, &AppMode::VARIANTS)
                .default_value(AppMode::default().as_str())
                .locked(),
        )
        .field(
            FieldSpec::string(APP_NAME)
                .default_value(DEFAULT_APP_NAME)
                .locked(),
        )
}
