//! Registration API for validated methods.
//!
//! A [`MethodBuilder`] collects parameter, group and output bindings for one
//! method, writes them into the registry and wraps the method body:
//!
//! ```ignore
//! let create = MethodBuilder::for_type::<UserService>("create")
//!     .param(0, user_schema)
//!     .output(user_schema_out)
//!     .options(ValidateOptions::new().mode(ValidationMode::CollectAll))
//!     .wrap_sync(|args| Ok(args[0].clone()));
//!
//! let user = create.call(vec![json!({"name": "John", "age": 20})]).await?;
//! ```

use crate::core::MethodKind;
use crate::dispatcher::{Dispatcher, MethodFn, MethodReturn, ValidatedMethod};
use crate::options::ValidateOptions;
use crate::registry::Target;
use crate::schema::Schema;
use futures::future::FutureExt;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Builder for one validated method.
pub struct MethodBuilder {
    dispatcher: Dispatcher,
    target: Target,
    method_name: String,
    params: Vec<(usize, Arc<dyn Schema>)>,
    groups: Vec<(Arc<dyn Schema>, IndexMap<String, usize>)>,
    output: Option<Arc<dyn Schema>>,
    options: Option<ValidateOptions>,
}

impl MethodBuilder {
    /// Starts a builder for `method_name` on `target`, using the global dispatcher.
    #[must_use]
    pub fn new(target: Target, method_name: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::global(),
            target,
            method_name: method_name.into(),
            params: Vec::new(),
            groups: Vec::new(),
            output: None,
            options: None,
        }
    }

    /// Starts a builder for a method owned by the Rust type `T`.
    #[must_use]
    pub fn for_type<T: ?Sized + 'static>(method_name: impl Into<String>) -> Self {
        Self::new(Target::of::<T>(), method_name)
    }

    /// Uses a specific dispatcher, and with it its registry and configuration.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Validates the argument at `position`.
    #[must_use]
    pub fn param(self, position: usize, schema: impl Schema + 'static) -> Self {
        self.param_shared(position, Arc::new(schema))
    }

    /// Validates the argument at `position` with a shared schema.
    #[must_use]
    pub fn param_shared(mut self, position: usize, schema: Arc<dyn Schema>) -> Self {
        self.params.push((position, schema));
        self
    }

    /// Validates several arguments together as one object.
    ///
    /// Each `(field, position)` pair puts the argument at `position` under
    /// `field` in the object handed to the schema.
    #[must_use]
    pub fn group<I, K>(self, schema: impl Schema + 'static, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        self.group_shared(Arc::new(schema), fields)
    }

    /// Like [`group`](Self::group) with a shared schema.
    #[must_use]
    pub fn group_shared<I, K>(mut self, schema: Arc<dyn Schema>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, usize)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(field, position)| (field.into(), position))
            .collect();
        self.groups.push((schema, fields));
        self
    }

    /// Validates the method's return value.
    #[must_use]
    pub fn output(self, schema: impl Schema + 'static) -> Self {
        self.output_shared(Arc::new(schema))
    }

    /// Like [`output`](Self::output) with a shared schema.
    #[must_use]
    pub fn output_shared(mut self, schema: Arc<dyn Schema>) -> Self {
        self.output = Some(schema);
        self
    }

    /// Overrides the configured defaults for this method.
    #[must_use]
    pub fn options(mut self, options: ValidateOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Writes every binding into the dispatcher's registry.
    fn install(self) -> (Dispatcher, Target, String) {
        let registry = self.dispatcher.registry();
        for (position, schema) in self.params {
            registry.register_parameter(&self.target, &self.method_name, position, schema);
        }
        for (schema, fields) in self.groups {
            registry.register_group(&self.target, &self.method_name, schema, fields);
        }
        if let Some(schema) = self.output {
            registry.register_output_schema(&self.target, &self.method_name, schema);
        }
        registry.register_options(&self.target, &self.method_name, self.options);
        (self.dispatcher, self.target, self.method_name)
    }

    /// Registers the bindings and wraps a method that may return a pending value.
    ///
    /// The method is treated as synchronous: with synchronous strategies a
    /// `Ready` return is validated without suspending.
    pub fn wrap<F>(self, method: F) -> ValidatedMethod
    where
        F: Fn(Vec<Value>) -> anyhow::Result<MethodReturn> + Send + Sync + 'static,
    {
        self.finish(MethodKind::Sync, Arc::new(method))
    }

    /// Registers the bindings and wraps a synchronous method.
    pub fn wrap_sync<F>(self, method: F) -> ValidatedMethod
    where
        F: Fn(Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.wrap(move |args| method(args).map(MethodReturn::Ready))
    }

    /// Registers the bindings and wraps an asynchronous method.
    ///
    /// Calls always take the asynchronous path.
    pub fn wrap_async<F, Fut>(self, method: F) -> ValidatedMethod
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let method: MethodFn = Arc::new(move |args: Vec<Value>| -> anyhow::Result<MethodReturn> {
            Ok(MethodReturn::Pending(method(args).boxed()))
        });
        self.finish(MethodKind::Async, method)
    }

    fn finish(self, kind: MethodKind, method: MethodFn) -> ValidatedMethod {
        let (dispatcher, target, method_name) = self.install();
        ValidatedMethod::new(dispatcher, target, method_name, kind, method)
    }
}

impl fmt::Debug for MethodBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(usize, &str)> = self
            .params
            .iter()
            .map(|(position, schema)| (*position, schema.name()))
            .collect();
        f.debug_struct("MethodBuilder")
            .field("target", &self.target)
            .field("method_name", &self.method_name)
            .field("params", &params)
            .field("groups", &self.groups.len())
            .field("output", &self.output.as_ref().map(|s| s.name()))
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValidationMode;
    use crate::testing::{accept_all, isolated_dispatcher as isolated};
    use pretty_assertions::assert_eq;

    struct Service;

    #[test]
    fn test_wrap_writes_registry() {
        let dispatcher = isolated();
        let method = MethodBuilder::for_type::<Service>("create")
            .with_dispatcher(dispatcher.clone())
            .param(1, accept_all("p1"))
            .param(0, accept_all("p0"))
            .group(accept_all("g"), [("name", 0), ("age", 1)])
            .output(accept_all("out"))
            .options(ValidateOptions::new().mode(ValidationMode::CollectAll))
            .wrap_sync(|_| Ok(Value::Null));

        assert_eq!(method.kind(), MethodKind::Sync);
        assert_eq!(method.method_name(), "create");

        let summaries = dispatcher.registry().list_metadata(&Target::of::<Service>());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].input_params, vec![0, 1]);
        assert_eq!(summaries[0].input_groups.len(), 1);
        assert!(summaries[0].has_output_schema);
        assert_eq!(
            summaries[0].options.as_ref().and_then(|o| o.mode),
            Some(ValidationMode::CollectAll)
        );
    }

    #[test]
    fn test_wrap_without_bindings_registers_nothing() {
        let dispatcher = isolated();
        let method = MethodBuilder::for_type::<Service>("plain")
            .with_dispatcher(dispatcher.clone())
            .wrap_sync(|args| Ok(Value::from(args.len())));

        assert!(dispatcher.registry().is_empty());
        let result = method.call(vec![Value::Null, Value::Null]).into_ready().unwrap();
        assert_eq!(result.unwrap(), Value::from(2));
    }

    #[test]
    fn test_wrap_async_kind() {
        let method = MethodBuilder::new(Target::named("svc"), "fetch")
            .with_dispatcher(isolated())
            .wrap_async(|_| async { Ok(Value::Null) });
        assert_eq!(method.kind(), MethodKind::Async);
        assert!(method.call(Vec::new()).is_pending());
    }

    #[test]
    fn test_default_builder_uses_global_registry() {
        struct GlobalOnlyService;

        MethodBuilder::for_type::<GlobalOnlyService>("list")
            .output(accept_all("out"))
            .wrap_sync(|_| Ok(Value::Null));

        let summaries = crate::registry::get_validation_metadata(&Target::of::<GlobalOnlyService>());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].method_name, "list");
        assert!(summaries[0].has_output_schema);
    }
}
