use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EnvError;

/// Runtime environment indicator (`NODE_ENV`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl NodeEnv {
    pub const VARIANTS: [&'static str; 3] = ["development", "production", "test"];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeEnv::Development => "development",
            NodeEnv::Production => "production",
            NodeEnv::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, NodeEnv::Production)
    }
}

impl FromStr for NodeEnv {
    type Err = EnvError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" => Ok(NodeEnv::Development),
            "production" => Ok(NodeEnv::Production),
            "test" => Ok(NodeEnv::Test),
            _ => Err(EnvError::InvalidMode {
                kind: "NODE_ENV",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for NodeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment context (`APP_MODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Development,
    Production,
    Test,
    Staging,
}

impl AppMode {
    pub const VARIANTS: [&'static str; 4] = ["development", "production", "test", "staging"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Development => "development",
            AppMode::Production => "production",
            AppMode::Test => "test",
            AppMode::Staging => "staging",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppMode::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, AppMode::Development)
    }
}

impl FromStr for AppMode {
    type Err = EnvError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" => Ok(AppMode::Development),
            "production" => Ok(AppMode::Production),
            "test" => Ok(AppMode::Test),
            "staging" => Ok(AppMode::Staging),
            _ => Err(EnvError::InvalidMode {
                kind: "APP_MODE",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_mode_from_str() {
        assert_eq!("staging".parse::<AppMode>().unwrap(), AppMode::Staging);
        assert_eq!(" Production ".parse::<AppMode>().unwrap(), AppMode::Production);
        assert!("prod".parse::<AppMode>().is_err());
    }

    #[test]
    fn test_node_env_rejects_staging() {
        assert_eq!("test".parse::<NodeEnv>().unwrap(), NodeEnv::Test);
        let err = "staging".parse::<NodeEnv>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid NODE_ENV: staging");
    }

    #[test]
    fn test_variants_match_display() {
        for name in AppMode::VARIANTS {
            assert_eq!(name.parse::<AppMode>().unwrap().to_string(), name);
        }
        for name in NodeEnv::VARIANTS {
            assert_eq!(name.parse::<NodeEnv>().unwrap().to_string(), name);
        }
    }
}
