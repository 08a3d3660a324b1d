//! Per-method validation metadata and the registry that stores it.

use super::Target;
use crate::options::ValidateOptions;
use crate::schema::Schema;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Several parameters validated together as one synthesized object.
#[derive(Clone)]
pub struct ParameterGroup {
    /// Schema applied to the synthesized object.
    pub schema: Arc<dyn Schema>,
    /// Field name to parameter position.
    pub position_map: IndexMap<String, usize>,
}

impl ParameterGroup {
    /// Builds the object validated by this group.
    ///
    /// Positions past the end of `args` are left out of the object, so the
    /// schema sees them as missing fields.
    #[must_use]
    pub fn synthesize(&self, args: &[Value]) -> Value {
        let mut object = Map::new();
        for (field, position) in &self.position_map {
            if let Some(value) = args.get(*position) {
                object.insert(field.clone(), value.clone());
            }
        }
        Value::Object(object)
    }
}

impl fmt::Debug for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterGroup")
            .field("schema", &self.schema.name())
            .field("position_map", &self.position_map)
            .finish()
    }
}

/// Everything registered for one (target, method) pair.
#[derive(Clone, Default)]
pub struct MethodMetadata {
    /// Validated positions, iterated in ascending order.
    pub parameter_schemas: BTreeMap<usize, Arc<dyn Schema>>,
    /// Groups in registration order.
    pub parameter_groups: Vec<ParameterGroup>,
    /// Schema for the resolved return value.
    pub output_schema: Option<Arc<dyn Schema>>,
    /// Override of the configured defaults.
    pub options: Option<ValidateOptions>,
}

impl MethodMetadata {
    /// Returns a summary that does not expose schema internals.
    #[must_use]
    pub fn summary(&self, method_name: &str) -> MethodSummary {
        MethodSummary {
            method_name: method_name.to_string(),
            input_params: self.parameter_schemas.keys().copied().collect(),
            input_groups: self
                .parameter_groups
                .iter()
                .map(|group| group.position_map.clone())
                .collect(),
            has_output_schema: self.output_schema.is_some(),
            options: self.options.clone(),
        }
    }
}

impl fmt::Debug for MethodMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: BTreeMap<usize, &str> = self
            .parameter_schemas
            .iter()
            .map(|(position, schema)| (*position, schema.name()))
            .collect();
        f.debug_struct("MethodMetadata")
            .field("parameter_schemas", &params)
            .field("parameter_groups", &self.parameter_groups)
            .field("output_schema", &self.output_schema.as_ref().map(|s| s.name()))
            .field("options", &self.options)
            .finish()
    }
}

/// Introspection record for one registered method.
#[derive(Debug, Clone, Serialize)]
pub struct MethodSummary {
    /// Method name.
    pub method_name: String,
    /// Validated parameter positions, ascending.
    pub input_params: Vec<usize>,
    /// Position maps of each group, in registration order.
    pub input_groups: Vec<IndexMap<String, usize>>,
    /// Whether an output schema is registered.
    pub has_output_schema: bool,
    /// The options override, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ValidateOptions>,
}

/// Store of method metadata keyed by exact target and method name.
///
/// Entries are created on first write and never removed.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: RwLock<HashMap<Target, IndexMap<String, MethodMetadata>>>,
}

impl MetadataRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<R>(
        &self,
        target: &Target,
        method_name: &str,
        update: impl FnOnce(&mut MethodMetadata) -> R,
    ) -> R {
        let mut entries = self.entries.write();
        let metadata = entries
            .entry(target.clone())
            .or_default()
            .entry(method_name.to_string())
            .or_default();
        update(metadata)
    }

    /// Binds a schema to a parameter position, replacing any previous one.
    pub fn register_parameter(
        &self,
        target: &Target,
        method_name: &str,
        position: usize,
        schema: Arc<dyn Schema>,
    ) {
        debug!(
            owner = %target,
            method = method_name,
            position,
            schema = schema.name(),
            "Registered parameter schema"
        );
        self.with_entry(target, method_name, |metadata| {
            metadata.parameter_schemas.insert(position, schema);
        });
    }

    /// Appends a group validated as one synthesized object.
    pub fn register_group<I, K>(
        &self,
        target: &Target,
        method_name: &str,
        schema: Arc<dyn Schema>,
        position_map: I,
    ) where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        let position_map: IndexMap<String, usize> = position_map
            .into_iter()
            .map(|(field, position)| (field.into(), position))
            .collect();
        debug!(
            owner = %target,
            method = method_name,
            fields = ?position_map,
            schema = schema.name(),
            "Registered parameter group"
        );
        self.with_entry(target, method_name, |metadata| {
            metadata.parameter_groups.push(ParameterGroup {
                schema,
                position_map,
            });
        });
    }

    /// Sets the output schema, replacing any previous one.
    pub fn register_output_schema(&self, target: &Target, method_name: &str, schema: Arc<dyn Schema>) {
        debug!(
            owner = %target,
            method = method_name,
            schema = schema.name(),
            "Registered output schema"
        );
        self.with_entry(target, method_name, |metadata| {
            metadata.output_schema = Some(schema);
        });
    }

    /// Sets the options override. `None` leaves the registry untouched.
    pub fn register_options(&self, target: &Target, method_name: &str, options: Option<ValidateOptions>) {
        let Some(options) = options else {
            return;
        };
        self.with_entry(target, method_name, |metadata| {
            metadata.options = Some(options);
        });
    }

    /// Returns a copy of the metadata for one method.
    #[must_use]
    pub fn lookup(&self, target: &Target, method_name: &str) -> Option<MethodMetadata> {
        self.entries
            .read()
            .get(target)
            .and_then(|methods| methods.get(method_name))
            .cloned()
    }

    /// Lists every method registered for a target, in registration order.
    #[must_use]
    pub fn list_metadata(&self, target: &Target) -> Vec<MethodSummary> {
        self.entries
            .read()
            .get(target)
            .map(|methods| {
                methods
                    .iter()
                    .map(|(name, metadata)| metadata.summary(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of registered methods across all targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().values().map(IndexMap::len).sum()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Global metadata registry.
pub static REGISTRY: LazyLock<Arc<MetadataRegistry>> =
    LazyLock::new(|| Arc::new(MetadataRegistry::new()));

/// Lists the global registry's methods for a target.
#[must_use]
pub fn get_validation_metadata(target: &Target) -> Vec<MethodSummary> {
    REGISTRY.list_metadata(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationMode;
    use crate::schema::{FnSchema, ParseError};
    use serde_json::json;

    struct Handler;
    struct OtherHandler;

    fn accept(name: &str) -> Arc<dyn Schema> {
        Arc::new(FnSchema::new(name, |value: &Value| -> Result<Value, ParseError> {
            Ok(value.clone())
        }))
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = MetadataRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(&Target::of::<Handler>(), "handle").is_none());
        assert!(registry.list_metadata(&Target::of::<Handler>()).is_empty());
    }

    #[test]
    fn test_register_parameter_overwrites_position() {
        let registry = MetadataRegistry::new();
        let target = Target::of::<Handler>();

        registry.register_parameter(&target, "handle", 1, accept("first"));
        registry.register_parameter(&target, "handle", 0, accept("zero"));
        registry.register_parameter(&target, "handle", 1, accept("second"));

        let metadata = registry.lookup(&target, "handle").unwrap();
        let positions: Vec<_> = metadata.parameter_schemas.keys().copied().collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(metadata.parameter_schemas[&1].name(), "second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_group_appends() {
        let registry = MetadataRegistry::new();
        let target = Target::of::<Handler>();

        registry.register_group(&target, "handle", accept("g1"), [("name", 0), ("age", 1)]);
        registry.register_group(&target, "handle", accept("g2"), [("age", 1)]);

        let metadata = registry.lookup(&target, "handle").unwrap();
        assert_eq!(metadata.parameter_groups.len(), 2);
        assert_eq!(metadata.parameter_groups[0].schema.name(), "g1");
        assert_eq!(metadata.parameter_groups[1].schema.name(), "g2");
    }

    #[test]
    fn test_register_output_and_options() {
        let registry = MetadataRegistry::new();
        let target = Target::of::<Handler>();

        registry.register_output_schema(&target, "handle", accept("out1"));
        registry.register_output_schema(&target, "handle", accept("out2"));
        registry.register_options(
            &target,
            "handle",
            Some(ValidateOptions::new().mode(ValidationMode::CollectAll)),
        );
        registry.register_options(&target, "handle", None);

        let metadata = registry.lookup(&target, "handle").unwrap();
        assert_eq!(metadata.output_schema.as_ref().map(|s| s.name()), Some("out2"));
        assert_eq!(
            metadata.options.as_ref().and_then(|o| o.mode),
            Some(ValidationMode::CollectAll)
        );
    }

    #[test]
    fn test_register_options_none_is_noop() {
        let registry = MetadataRegistry::new();
        registry.register_options(&Target::of::<Handler>(), "handle", None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = MetadataRegistry::new();
        registry.register_parameter(&Target::of::<Handler>(), "handle", 0, accept("s"));

        assert!(registry.lookup(&Target::of::<OtherHandler>(), "handle").is_none());
        assert!(registry.lookup(&Target::of::<Handler>(), "Handle").is_none());
        assert!(registry.lookup(&Target::named("Handler"), "handle").is_none());
    }

    #[test]
    fn test_list_metadata_in_registration_order() {
        let registry = MetadataRegistry::new();
        let target = Target::of::<Handler>();

        registry.register_output_schema(&target, "zeta", accept("out"));
        registry.register_parameter(&target, "alpha", 2, accept("p2"));
        registry.register_parameter(&target, "alpha", 0, accept("p0"));
        registry.register_group(&target, "alpha", accept("g"), [("name", 0)]);
        registry.register_options(
            &target,
            "alpha",
            Some(ValidateOptions::new().validate_outputs(false)),
        );

        let summaries = registry.list_metadata(&target);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].method_name, "zeta");
        assert!(summaries[0].has_output_schema);
        assert!(summaries[0].input_params.is_empty());

        assert_eq!(summaries[1].method_name, "alpha");
        assert_eq!(summaries[1].input_params, vec![0, 2]);
        assert_eq!(summaries[1].input_groups[0].get("name"), Some(&0));
        assert!(!summaries[1].has_output_schema);
        assert_eq!(
            summaries[1].options.as_ref().and_then(|o| o.validate_outputs),
            Some(false)
        );
    }

    #[test]
    fn test_summary_serializes_without_schemas() {
        let registry = MetadataRegistry::new();
        let target = Target::of::<Handler>();
        registry.register_parameter(&target, "handle", 0, accept("s"));

        let json = serde_json::to_value(&registry.list_metadata(&target)).unwrap();
        assert_eq!(
            json,
            json!([{
                "method_name": "handle",
                "input_params": [0],
                "input_groups": [],
                "has_output_schema": false
            }])
        );
    }

    #[test]
    fn test_group_synthesize() {
        let group = ParameterGroup {
            schema: accept("g"),
            position_map: [("name".to_string(), 0), ("age".to_string(), 1), ("extra".to_string(), 5)]
                .into_iter()
                .collect(),
        };
        let object = group.synthesize(&[json!("Jane"), json!(30)]);
        assert_eq!(object, json!({"name": "Jane", "age": 30}));
    }
}
