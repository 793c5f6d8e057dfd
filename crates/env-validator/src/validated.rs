use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mode::{AppMode, NodeEnv};
use crate::schema::{APP_MODE, APP_NAME, NODE_ENV};
use crate::{EnvError, EnvResult};

/// Output of a successful validation pass.
///
/// Keys are exactly the schema-declared keys that have a value, in sorted
/// order. Values are typed JSON (strings, numbers, booleans).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedEnv {
    values: Map<String, Value>,
}

impl ValidatedEnv {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Typed read of a single key
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> EnvResult<T> {
        let value = self.values.get(key).cloned().ok_or_else(|| EnvError::Access {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            message: "missing".to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| EnvError::Access {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            message: e.to_string(),
        })
    }

    /// Deserialize the whole env into a typed struct
    pub fn deserialize<T: DeserializeOwned>(&self) -> EnvResult<T> {
        Ok(serde_json::from_value(Value::Object(self.values.clone()))?)
    }

    pub fn node_env(&self) -> EnvResult<NodeEnv> {
        self.get_str(NODE_ENV).unwrap_or_default().parse()
    }

    pub fn app_mode(&self) -> EnvResult<AppMode> {
        self.get_str(APP_MODE).unwrap_or_default().parse()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.get_str(APP_NAME)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Values rendered back to env strings, for writing into a store
    pub fn to_env_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), render_value(value)?)))
            .collect()
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ValidatedEnv {
        let Value::Object(map) = json!({
            "APP_MODE": "staging",
            "DB_PORT": 5432,
            "FEATURE_FLAG": true,
            "RATIO": 0.5,
        }) else {
            unreachable!()
        };
        ValidatedEnv::new(map)
    }

    #[test]
    fn test_typed_getters() {
        let env = sample();
        assert_eq!(env.get_i64("DB_PORT"), Some(5432));
        assert_eq!(env.get_bool("FEATURE_FLAG"), Some(true));
        assert_eq!(env.get_f64("RATIO"), Some(0.5));
        assert_eq!(env.app_mode().unwrap(), AppMode::Staging);
        assert_eq!(env.get_as::<u16>("DB_PORT").unwrap(), 5432);
        assert!(env.get_as::<u16>("MISSING").is_err());
    }

    #[test]
    fn test_env_pairs_render_scalars() {
        let pairs = sample().to_env_pairs();
        assert_eq!(
            pairs,
            vec![
                ("APP_MODE".to_string(), "staging".to_string()),
                ("DB_PORT".to_string(), "5432".to_string()),
                ("FEATURE_FLAG".to_string(), "true".to_string()),
                ("RATIO".to_string(), "0.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_env_has_no_mode() {
        assert!(ValidatedEnv::empty().app_mode().is_err());
    }
}
