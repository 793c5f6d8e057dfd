//! Command-line front end for `opstd-env-validator`.

pub mod commands;
pub mod settings;

pub use commands::{
    build_schema, check, render_env, render_failure, render_summary, render_tiers, tier_listing,
    CheckOutcome, PrintFormat,
};
pub use settings::{CliSettings, SettingsOverrides, DEFAULT_SETTINGS_FILE, ENV_PREFIX};
