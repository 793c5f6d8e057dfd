use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde_json::{Map, Number, Value};
use url::Url;

use crate::schema::{FieldKind, FieldSpec, Presence, Schema};
use crate::{EnvError, EnvResult, ValidatedEnv, ValidationError, ValidationIssue};

/// Caller-supplied failure callback
pub type ValidationErrorCallback = Arc<dyn Fn(&ValidationError) + Send + Sync>;

/// What a validator does when the schema rejects the input
#[derive(Clone, Default)]
pub enum ValidationErrorHandler {
    /// Log the report and fail the `validate()` call
    #[default]
    Fail,
    /// Hand the error to the callback and continue with an empty env
    Custom(ValidationErrorCallback),
}

impl ValidationErrorHandler {
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&ValidationError) + Send + Sync + 'static,
    {
        ValidationErrorHandler::Custom(Arc::new(handler))
    }
}

impl fmt::Debug for ValidationErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorHandler::Fail => f.write_str("Fail"),
            ValidationErrorHandler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Schema {
    /// Parse normalized variables against this schema.
    ///
    /// Every field is checked before failing, so the error lists all issues.
    /// Undeclared keys are dropped. Transforms run only once all fields pass;
    /// their errors are returned as-is.
    pub fn parse(&self, input: &BTreeMap<String, String>) -> EnvResult<ValidatedEnv> {
        let mut values = Map::new();
        let mut issues = Vec::new();

        for spec in self.fields() {
            match parse_field(spec, input.get(&spec.name).map(String::as_str)) {
                Ok(Some(value)) => {
                    values.insert(spec.name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => issues.push(ValidationIssue::new(&spec.name, message)),
            }
        }

        if !issues.is_empty() {
            return Err(EnvError::Validation(ValidationError::new(issues)));
        }

        for transform in self.transforms() {
            transform(&mut values)?;
        }

        Ok(ValidatedEnv::new(values))
    }
}

fn parse_field(spec: &FieldSpec, raw: Option<&str>) -> Result<Option<Value>, String> {
    let raw = match (raw, &spec.presence) {
        (Some(raw), _) => raw,
        (None, Presence::Default(default)) => default.as_str(),
        (None, Presence::Optional) => return Ok(None),
        (None, Presence::Required) => return Err("Required".to_string()),
    };

    if let Some(min) = spec.min_len {
        if raw.chars().count() < min {
            return Err(format!("String must contain at least {min} character(s)"));
        }
    }

    let value = coerce(&spec.kind, raw)?;
    if let (Some(range), Value::Number(number)) = (&spec.int_range, &value) {
        check_range(range, number)?;
    }
    Ok(Some(value))
}

fn check_range(range: &RangeInclusive<i64>, number: &Number) -> Result<(), String> {
    let Some(int) = number.as_i64() else {
        return Err("Expected integer, received float".to_string());
    };
    if int < *range.start() {
        return Err(format!(
            "Number must be greater than or equal to {}",
            range.start()
        ));
    }
    if int > *range.end() {
        return Err(format!(
            "Number must be less than or equal to {}",
            range.end()
        ));
    }
    Ok(())
}

fn coerce(kind: &FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::String => Ok(Value::String(raw.to_string())),
        FieldKind::Url => Url::parse(raw)
            .map(|_| Value::String(raw.to_string()))
            .map_err(|_| "Invalid url".to_string()),
        FieldKind::Number => parse_number(raw)
            .map(Value::Number)
            .ok_or_else(|| format!("Expected number, received \"{raw}\"")),
        FieldKind::Boolean => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| format!("Expected boolean, received \"{raw}\"")),
        FieldKind::Enum(variants) => {
            if variants.iter().any(|v| v == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                let expected = variants
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                Err(format!(
                    "Invalid enum value. Expected {expected}, received '{raw}'"
                ))
            }
        }
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Number::from(int));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
