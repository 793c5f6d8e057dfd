//! Variable stores the validator reads from and writes back to.
//!
//! The validator never touches the process environment directly; it works on
//! an [`EnvStore`]. [`ProcessEnv`] adapts the ambient process environment,
//! [`MemoryEnv`] is an owned snapshot for tests and tools.

use std::collections::BTreeMap;

/// Key/value context holding raw environment variables
pub trait EnvStore {
    /// Look up a single variable
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace a variable
    fn set(&mut self, key: &str, value: &str);

    /// Drop a variable; missing keys are ignored
    fn unset(&mut self, key: &str);

    /// All variables, sorted by key
    fn vars(&self) -> Vec<(String, String)>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory variable snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: BTreeMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.vars
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl EnvStore for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn unset(&mut self, key: &str) {
        self.vars.remove(key);
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Adapter over the process environment.
///
/// Writes are process-wide. Construct validators over this store during the
/// single-threaded startup phase only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn unset(&mut self, key: &str) {
        std::env::remove_var(key);
    }

    fn vars(&self) -> Vec<(String, String)> {
        // non-unicode entries cannot be schema keys
        let mut vars: Vec<(String, String)> = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        vars.sort();
        vars
    }
}
