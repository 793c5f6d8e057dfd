//! Declarative env schemas.
//!
//! A [`Schema`] is an ordered set of [`FieldSpec`]s plus whole-object
//! transforms that run after every field has parsed. Schemas are plain
//! values: build once, merge, then hand to the validator.

pub mod base;
pub mod database;

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use crate::EnvResult;

pub use base::{base_schema, APP_MODE, APP_NAME, DEFAULT_APP_NAME, NODE_ENV};
pub use database::{database_schema, DatabaseEnv};

/// Value type of a field and how its raw string is coerced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept verbatim
    String,
    /// Absolute URL, kept verbatim
    Url,
    /// Coerced to a JSON number
    Number,
    /// Coerced from `true/false/1/0/yes/no/on/off`
    Boolean,
    /// One of a closed set of literals
    Enum(Vec<String>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Url => "url",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Enum(_) => "enum",
        }
    }
}

/// What happens when a field has no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Raw default, parsed like any supplied value
    Default(String),
}

/// One recognized variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub presence: Presence,
    pub min_len: Option<usize>,
    /// Numbers must be integers within this range
    pub int_range: Option<RangeInclusive<i64>>,
    /// Locked fields keep their definition when another schema is merged in
    pub locked: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            presence: Presence::Required,
            min_len: None,
            int_range: None,
            locked: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn url(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Url)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn one_of<S: AsRef<str>>(name: impl Into<String>, variants: &[S]) -> Self {
        Self::new(
            name,
            FieldKind::Enum(variants.iter().map(|v| v.as_ref().to_string()).collect()),
        )
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.presence = Presence::Default(value.into());
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    pub fn int_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.int_range = Some(range);
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

/// Whole-object rule applied after all fields validate
pub type SchemaTransform = Arc<dyn Fn(&mut Map<String, Value>) -> EnvResult<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    transforms: Vec<SchemaTransform>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any field of the same name
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.insert(spec);
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&mut Map<String, Value>) -> EnvResult<()> + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    fn insert(&mut self, spec: FieldSpec) {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
    }

    /// Merge `other` into this schema.
    ///
    /// Fields from `other` are added or replace ours, except locked fields,
    /// which keep this schema's definition. Transforms run ours first.
    pub fn merge(mut self, other: Schema) -> Self {
        for spec in other.fields {
            if self.get(&spec.name).is_some_and(|f| f.locked) {
                warn!(
                    "Ignoring redefinition of core env key {} by extension schema",
                    spec.name
                );
                continue;
            }
            self.insert(spec);
        }
        self.transforms.extend(other.transforms);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub(crate) fn transforms(&self) -> &[SchemaTransform] {
        &self.transforms
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}
