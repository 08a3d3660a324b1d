//! Test fixtures: a shape schema and isolated dispatchers.

use crate::config::{ConfigStore, ValidationConfig};
use crate::dispatcher::Dispatcher;
use crate::errors::{Issue, PathSegment, SchemaValidationError};
use crate::registry::MetadataRegistry;
use crate::schema::{ParseError, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Environment variable isolated dispatchers read; never set by the crate.
pub const ISOLATED_ENV_VAR: &str = "SCHEMAGATE_TEST_ISOLATED_ENABLED";

/// Creates a dispatcher with its own registry and configuration.
///
/// The configuration reads [`ISOLATED_ENV_VAR`] instead of the process-wide
/// switch, so tests are unaffected by the caller's environment.
#[must_use]
pub fn isolated_dispatcher() -> Dispatcher {
    isolated_dispatcher_with(ValidationConfig::default())
}

/// Like [`isolated_dispatcher`] starting from the given configuration.
#[must_use]
pub fn isolated_dispatcher_with(config: ValidationConfig) -> Dispatcher {
    let config = ValidationConfig {
        env_var: ISOLATED_ENV_VAR.to_string(),
        ..config
    };
    Dispatcher::new(
        Arc::new(MetadataRegistry::new()),
        Arc::new(ConfigStore::with_config(config)),
    )
}

/// A structural schema described by a JSON template.
///
/// Template forms:
/// - `"string"`, `"number"`, `"integer"`, `"boolean"`, `"object"`, `"array"`, `"any"`
/// - `{ "field": <template> }`: an object whose fields are all required;
///   a field name ending in `?` is optional
/// - `[<template>]`: an array whose elements all match the template
///
/// Every mismatch is reported, each at its own path.
#[derive(Debug, Clone)]
pub struct ShapeSchema {
    name: String,
    template: Value,
}

impl ShapeSchema {
    /// Creates a schema from a template.
    #[must_use]
    pub fn new(name: impl Into<String>, template: Value) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }

    /// Returns the template.
    #[must_use]
    pub fn template(&self) -> &Value {
        &self.template
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_kind(kind: &str, value: &Value) -> bool {
    match kind {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn check(template: &Value, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) {
    let mismatch = |expected: &str| {
        Issue::new("invalid_type", format!("Expected {expected}, received {}", type_label(value)))
            .at(path.iter().cloned())
    };

    match template {
        Value::String(kind) => {
            if !matches_kind(kind, value) {
                issues.push(mismatch(kind.as_str()));
            }
        }
        Value::Object(fields) => {
            let Some(object) = value.as_object() else {
                issues.push(mismatch("object"));
                return;
            };
            for (field, field_template) in fields {
                let (key, optional) = match field.strip_suffix('?') {
                    Some(key) => (key, true),
                    None => (field.as_str(), false),
                };
                let mut field_path = path.to_vec();
                field_path.push(PathSegment::from(key));
                match object.get(key) {
                    Some(field_value) => check(field_template, field_value, &field_path, issues),
                    None if optional => {}
                    None => issues.push(Issue::new("invalid_type", "Required").at(field_path)),
                }
            }
        }
        Value::Array(items) => {
            let Some(elements) = value.as_array() else {
                issues.push(mismatch("array"));
                return;
            };
            if let Some(item_template) = items.first() {
                for (index, element) in elements.iter().enumerate() {
                    let mut item_path = path.to_vec();
                    item_path.push(PathSegment::from(index));
                    check(item_template, element, &item_path, issues);
                }
            }
        }
        _ => {}
    }
}

#[async_trait]
impl Schema for ShapeSchema {
    fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        let mut issues = Vec::new();
        check(&self.template, value, &[], &mut issues);
        if issues.is_empty() {
            Ok(value.clone())
        } else {
            Err(SchemaValidationError::new(issues).into())
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
