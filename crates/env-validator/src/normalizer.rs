use std::collections::BTreeMap;

use crate::mode::{AppMode, NodeEnv};
use crate::schema::{APP_MODE, APP_NAME, DEFAULT_APP_NAME, NODE_ENV};

/// Turns raw store entries into validator input.
///
/// Keys are upper-cased and stripped of the service prefix, values trimmed,
/// empty values dropped. When two entries normalize to the same key the
/// winner is fixed: prefixed beats unprefixed, an already upper-case key
/// beats its case variants, then sorted key order decides.
#[derive(Debug, Clone)]
pub struct Normalizer {
    prefix: Option<String>,
    default_app_mode: AppMode,
}

#[derive(Debug)]
struct Candidate<'a> {
    prefixed: bool,
    canonical: bool,
    original: &'a str,
    key: String,
    value: String,
}

impl Candidate<'_> {
    fn rank(&self) -> (bool, bool, &str) {
        (self.prefixed, self.canonical, self.original)
    }
}

impl Normalizer {
    pub fn new(service_prefix: &str, default_app_mode: AppMode) -> Self {
        let prefix = Some(service_prefix.trim().to_uppercase()).filter(|p| !p.is_empty());
        Self {
            prefix,
            default_app_mode,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn normalize(&self, vars: &[(String, String)]) -> BTreeMap<String, String> {
        let mut candidates: Vec<Candidate<'_>> = vars
            .iter()
            .filter_map(|(key, value)| self.candidate(key, value))
            .collect();
        candidates.sort_by(|a, b| a.rank().cmp(&b.rank()));

        let mut normalized = BTreeMap::new();
        for candidate in candidates {
            normalized.insert(candidate.key, candidate.value);
        }

        normalized
            .entry(NODE_ENV.to_string())
            .or_insert_with(|| NodeEnv::default().to_string());
        normalized
            .entry(APP_MODE.to_string())
            .or_insert_with(|| self.default_app_mode.to_string());
        normalized
            .entry(APP_NAME.to_string())
            .or_insert_with(|| DEFAULT_APP_NAME.to_string());

        normalized
    }

    /// Winning value for one normalized key, without defaults
    pub fn resolve(&self, vars: &[(String, String)], key: &str) -> Option<String> {
        vars.iter()
            .filter_map(|(name, value)| self.candidate(name, value))
            .filter(|candidate| candidate.key == key)
            .max_by(|a, b| a.rank().cmp(&b.rank()))
            .map(|candidate| candidate.value)
    }

    fn candidate<'a>(&self, original: &'a str, value: &str) -> Option<Candidate<'a>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let upper = original.to_uppercase();
        let canonical = upper == original;
        let (key, prefixed) = match &self.prefix {
            Some(prefix) if upper.starts_with(prefix.as_str()) => {
                (upper[prefix.len()..].to_string(), true)
            }
            _ => (upper, false),
        };
        if key.is_empty() {
            return None;
        }

        let value = if key == NODE_ENV || key == APP_MODE {
            value.to_lowercase()
        } else {
            value.to_string()
        };

        Some(Candidate {
            prefixed,
            canonical,
            original,
            key,
            value,
        })
    }
}
