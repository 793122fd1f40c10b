//! Declarative block schemas and validation.
//!
//! Each block type describes its accepted shape as a static tree of
//! [`Field`]s and [`Rule`]s. Validation is two-phase:
//!
//! 1. **Check**: walk the JSON input against the rule tree and collect
//!    *every* violation as a `{path, message}` pair. Paths are dot-joined
//!    with numeric array indices (`plans.0.features.1.text`).
//! 2. **Normalize**: deserialize into the block's typed data struct. Every
//!    struct is `#[serde(default)]`, so omitted optional fields and whole
//!    option groups pick up their documented defaults.
//!
//! Unknown keys are stripped (serde ignores them), enum values outside the
//! allowed set are rejected rather than coerced, and `null` is only legal
//! where a rule explicitly says so.
//!
//! ```text
//! const FIELDS: &[Field] = &[
//!     Field::optional("variant", Rule::Enum(&["simple", "split"])),
//!     Field::required("title", Rule::Str { min: 1, max: Some(120) }),
//!     Field::optional("items", Rule::Array { item: &Rule::Object(ITEM), min: 1, max: Some(5) }),
//! ];
//! ```
//!
//! Logging of validation attempts happens in [`validate_logged`], a wrapper
//! applied at the call site; the checker itself stays pure.

use crate::logging::Logger;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A single constraint on a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Str { min: usize, max: Option<usize> },
    Enum(&'static [&'static str]),
    Bool,
    Number { min: Option<f64>, max: Option<f64> },
    Int { min: Option<i64>, max: Option<i64> },
    Array { item: &'static Rule, min: usize, max: Option<usize> },
    Object(&'static [Field]),
    /// `null` or the inner rule.
    Nullable(&'static Rule),
    Any,
}

/// Unbounded string, the most common rule.
pub const TEXT: Rule = Rule::Str { min: 0, max: None };

/// A named member of an object rule.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: false,
        }
    }
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every violation found in one validation pass. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "invalid block data: {}", joined.join("; "))
    }
}

impl ValidationErrors {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    /// True if any error sits at `path` or below it.
    pub fn touches(&self, path: &str) -> bool {
        self.errors.iter().any(|e| {
            e.path == path || e.path.strip_prefix(path).is_some_and(|r| r.starts_with('.'))
        })
    }
}

/// Validation outcome in the `{success, data}` / `{success, error}` shape
/// editor front-ends already consume.
pub fn report(result: &Result<Value, ValidationErrors>) -> Value {
    match result {
        Ok(data) => serde_json::json!({ "success": true, "data": data }),
        Err(errors) => serde_json::json!({ "success": false, "error": errors }),
    }
}

// ============================================================================
// Checking
// ============================================================================

/// Check `value` against an object schema, collecting every violation.
pub fn check(fields: &'static [Field], value: &Value) -> Vec<FieldError> {
    let mut checker = Checker::default();
    checker.rule(&Rule::Object(fields), value);
    checker.errors
}

#[derive(Default)]
struct Checker {
    path: Vec<String>,
    errors: Vec<FieldError>,
}

impl Checker {
    fn push(&mut self, message: String) {
        self.errors.push(FieldError {
            path: self.path.join("."),
            message,
        });
    }

    fn rule(&mut self, rule: &Rule, value: &Value) {
        match rule {
            Rule::Any => {}
            Rule::Nullable(inner) => {
                if !value.is_null() {
                    self.rule(inner, value);
                }
            }
            Rule::Str { min, max } => {
                let Some(s) = value.as_str() else {
                    return self.mismatch("string", value);
                };
                let len = s.chars().count();
                if len < *min {
                    self.push(format!("String must contain at least {min} character(s)"));
                }
                if let Some(max) = max
                    && len > *max
                {
                    self.push(format!("String must contain at most {max} character(s)"));
                }
            }
            Rule::Enum(allowed) => {
                let Some(s) = value.as_str() else {
                    return self.mismatch("string", value);
                };
                if !allowed.contains(&s) {
                    let expected: Vec<String> = allowed.iter().map(|a| format!("'{a}'")).collect();
                    self.push(format!(
                        "Invalid enum value. Expected {}, received '{s}'",
                        expected.join(" | ")
                    ));
                }
            }
            Rule::Bool => {
                if !value.is_boolean() {
                    self.mismatch("boolean", value);
                }
            }
            Rule::Number { min, max } => {
                let Some(n) = value.as_f64() else {
                    return self.mismatch("number", value);
                };
                if let Some(min) = min
                    && n < *min
                {
                    self.push(format!("Number must be greater than or equal to {min}"));
                }
                if let Some(max) = max
                    && n > *max
                {
                    self.push(format!("Number must be less than or equal to {max}"));
                }
            }
            Rule::Int { min, max } => {
                if !value.is_number() {
                    return self.mismatch("integer", value);
                }
                let Some(n) = value.as_i64() else {
                    if value.is_u64() {
                        return self.push("Number is too large".to_string());
                    }
                    return self.push("Expected integer, received float".to_string());
                };
                if let Some(min) = min
                    && n < *min
                {
                    self.push(format!("Number must be greater than or equal to {min}"));
                }
                if let Some(max) = max
                    && n > *max
                {
                    self.push(format!("Number must be less than or equal to {max}"));
                }
            }
            Rule::Array { item, min, max } => {
                let Some(items) = value.as_array() else {
                    return self.mismatch("array", value);
                };
                if items.len() < *min {
                    self.push(format!("Array must contain at least {min} element(s)"));
                }
                if let Some(max) = max
                    && items.len() > *max
                {
                    self.push(format!("Array must contain at most {max} element(s)"));
                }
                for (i, item_value) in items.iter().enumerate() {
                    self.path.push(i.to_string());
                    self.rule(item, item_value);
                    self.path.pop();
                }
            }
            Rule::Object(fields) => {
                let Some(map) = value.as_object() else {
                    return self.mismatch("object", value);
                };
                self.object(fields, map);
            }
        }
    }

    fn object(&mut self, fields: &[Field], map: &Map<String, Value>) {
        for field in fields {
            self.path.push(field.name.to_string());
            match map.get(field.name) {
                Some(v) => self.rule(&field.rule, v),
                None if field.required => self.push("Required".to_string()),
                None => {}
            }
            self.path.pop();
        }
    }

    fn mismatch(&mut self, expected: &str, value: &Value) {
        self.push(format!("Expected {expected}, received {}", kind(value)));
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check `value` against `fields`, then deserialize it with defaults applied.
pub fn validate<T: DeserializeOwned>(
    fields: &'static [Field],
    value: &Value,
) -> Result<T, ValidationErrors> {
    let errors = check(fields, value);
    if !errors.is_empty() {
        return Err(ValidationErrors { errors });
    }
    serde_json::from_value(value.clone()).map_err(|e| ValidationErrors::single("", e.to_string()))
}

/// Run a validation and record the attempt and its outcome.
pub fn validate_logged<T>(
    logger: &dyn Logger,
    block: &str,
    run: impl FnOnce() -> Result<T, ValidationErrors>,
) -> Result<T, ValidationErrors> {
    let target = format!("schema.{block}");
    logger.debug(&target, "validating block data");
    let result = run();
    match &result {
        Ok(_) => logger.debug(&target, "block data valid"),
        Err(e) => logger.warn(
            &target,
            &format!("block data rejected with {} error(s): {e}", e.errors.len()),
        ),
    }
    result
}
