//! The validation dispatcher.
//!
//! A call runs in up to three steps: input validation, the method itself,
//! output validation. When every enabled phase uses a synchronous strategy
//! and the method is synchronous, the whole call completes without
//! suspending. Any asynchronous piece moves the call onto a future.

use super::invocation::{Dispatched, MethodFn, MethodFuture, MethodReturn};
use super::phase::{raise_phase_errors, PhaseScope};
use crate::config::{ConfigStore, CONFIG};
use crate::core::{MethodKind, ValidationKind, ValidationMode, ValidationStrategy};
use crate::errors::{SchemaValidationError, ValidateError};
use crate::options::{ResolvedOptions, ValidateOptions};
use crate::registry::{MetadataRegistry, MethodMetadata, Target, REGISTRY};
use crate::schema::{validate_schema, validate_schema_sync, Schema};
use futures::future::{FutureExt, TryFutureExt};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

static MISSING: Value = Value::Null;

/// Every input check for one call, positional first then groups.
///
/// A registered position with no argument is checked against `null`.
fn input_checks<'a>(
    metadata: &'a MethodMetadata,
    args: &'a [Value],
) -> impl Iterator<Item = (&'a dyn Schema, Cow<'a, Value>)> + 'a {
    let positional = metadata.parameter_schemas.iter().map(move |(position, schema)| {
        let value = args.get(*position).unwrap_or(&MISSING);
        (schema.as_ref(), Cow::Borrowed(value))
    });
    let groups = metadata
        .parameter_groups
        .iter()
        .map(move |group| (group.schema.as_ref(), Cow::Owned(group.synthesize(args))));
    positional.chain(groups)
}

fn collect_inputs_sync(
    metadata: &MethodMetadata,
    args: &[Value],
    strategy: ValidationStrategy,
    mode: ValidationMode,
) -> Result<Vec<SchemaValidationError>, ValidateError> {
    let mut errors = Vec::new();
    for (schema, value) in input_checks(metadata, args) {
        if let Some(err) = validate_schema_sync(schema, &value, strategy)? {
            errors.push(err);
            if mode == ValidationMode::FailFast {
                break;
            }
        }
    }
    Ok(errors)
}

async fn collect_inputs(
    metadata: &MethodMetadata,
    args: &[Value],
    strategy: ValidationStrategy,
    mode: ValidationMode,
) -> Result<Vec<SchemaValidationError>, ValidateError> {
    let mut errors = Vec::new();
    for (schema, value) in input_checks(metadata, args) {
        if let Some(err) = validate_schema(schema, &value, strategy).await? {
            errors.push(err);
            if mode == ValidationMode::FailFast {
                break;
            }
        }
    }
    Ok(errors)
}

fn check_output_sync(
    metadata: &MethodMetadata,
    value: &Value,
    strategy: ValidationStrategy,
) -> Result<Option<SchemaValidationError>, ValidateError> {
    match &metadata.output_schema {
        Some(schema) => validate_schema_sync(schema.as_ref(), value, strategy),
        None => Ok(None),
    }
}

async fn check_output(
    metadata: &MethodMetadata,
    value: &Value,
    strategy: ValidationStrategy,
) -> Result<Option<SchemaValidationError>, ValidateError> {
    match &metadata.output_schema {
        Some(schema) => validate_schema(schema.as_ref(), value, strategy).await,
        None => Ok(None),
    }
}

/// Everything a single call needs once the method has been looked up.
struct Call {
    target: Target,
    method_name: String,
    metadata: MethodMetadata,
    options: ResolvedOptions,
}

impl Call {
    fn scope(&self, kind: ValidationKind) -> PhaseScope<'_> {
        PhaseScope::new(&self.target, &self.method_name, kind, &self.options)
    }

    fn inputs_sync(&self, args: &[Value]) -> Result<(), ValidateError> {
        if !self.options.validate_inputs {
            return Ok(());
        }
        let errors = collect_inputs_sync(&self.metadata, args, self.options.input, self.options.mode)?;
        raise_phase_errors(errors, &self.scope(ValidationKind::Input))
    }

    async fn inputs(&self, args: &[Value]) -> Result<(), ValidateError> {
        if !self.options.validate_inputs {
            return Ok(());
        }
        let errors = collect_inputs(&self.metadata, args, self.options.input, self.options.mode).await?;
        raise_phase_errors(errors, &self.scope(ValidationKind::Input))
    }

    fn output_sync(&self, value: &Value) -> Result<(), ValidateError> {
        if !self.options.validate_outputs {
            return Ok(());
        }
        let error = check_output_sync(&self.metadata, value, self.options.output)?;
        raise_phase_errors(error.into_iter().collect(), &self.scope(ValidationKind::Output))
    }

    async fn output(&self, value: &Value) -> Result<(), ValidateError> {
        if !self.options.validate_outputs {
            return Ok(());
        }
        let error = check_output(&self.metadata, value, self.options.output).await?;
        raise_phase_errors(error.into_iter().collect(), &self.scope(ValidationKind::Output))
    }

    /// Validates a method result that arrived later.
    async fn settle(self, pending: MethodFuture) -> Result<Value, ValidateError> {
        let value = pending.await.map_err(ValidateError::Method)?;
        self.output(&value).await?;
        Ok(value)
    }

    /// Validates a pending result with synchronous strategies only.
    async fn settle_sync(self, pending: MethodFuture) -> Result<Value, ValidateError> {
        let value = pending.await.map_err(ValidateError::Method)?;
        self.output_sync(&value)?;
        Ok(value)
    }

    async fn run(self, method: MethodFn, args: Vec<Value>) -> Result<Value, ValidateError> {
        self.inputs(&args).await?;
        match method(args).map_err(ValidateError::Method)? {
            MethodReturn::Ready(value) => {
                self.output(&value).await?;
                Ok(value)
            }
            MethodReturn::Pending(pending) => self.settle(pending).await,
        }
    }

    fn run_sync(self, method: &MethodFn, args: Vec<Value>) -> Dispatched {
        if let Err(err) = self.inputs_sync(&args) {
            return Dispatched::Ready(Err(err));
        }
        match method(args) {
            Err(err) => Dispatched::Ready(Err(ValidateError::Method(err))),
            Ok(MethodReturn::Ready(value)) => Dispatched::Ready(self.output_sync(&value).map(|()| value)),
            Ok(MethodReturn::Pending(pending)) => Dispatched::Pending(self.settle_sync(pending).boxed()),
        }
    }
}

/// Forwards a method's result without validating anything.
fn passthrough(result: anyhow::Result<MethodReturn>) -> Dispatched {
    match result {
        Ok(MethodReturn::Ready(value)) => Dispatched::Ready(Ok(value)),
        Ok(MethodReturn::Pending(pending)) => {
            Dispatched::Pending(pending.map_err(ValidateError::Method).boxed())
        }
        Err(err) => Dispatched::Ready(Err(ValidateError::Method(err))),
    }
}

/// Runs validated calls against one registry and one configuration store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MetadataRegistry>,
    config: Arc<ConfigStore>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::global()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry and configuration.
    #[must_use]
    pub fn new(registry: Arc<MetadataRegistry>, config: Arc<ConfigStore>) -> Self {
        Self { registry, config }
    }

    /// Creates a dispatcher over the process-wide registry and configuration.
    #[must_use]
    pub fn global() -> Self {
        Self::new(Arc::clone(&REGISTRY), Arc::clone(&CONFIG))
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<MetadataRegistry> {
        &self.registry
    }

    /// Returns the configuration store.
    #[must_use]
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Resolves the options a call to `method_name` would use right now.
    #[must_use]
    pub fn resolve_options(&self, target: &Target, method_name: &str) -> ResolvedOptions {
        let options = self
            .registry
            .lookup(target, method_name)
            .and_then(|metadata| metadata.options);
        resolve(options.as_ref(), self)
    }

    /// Collects input errors with a synchronous strategy.
    ///
    /// Fails with a configuration error if `strategy` is asynchronous.
    /// Under fail-fast at most one error is returned.
    pub fn validate_inputs_sync(
        &self,
        target: &Target,
        method_name: &str,
        args: &[Value],
        strategy: ValidationStrategy,
        mode: ValidationMode,
    ) -> Result<Vec<SchemaValidationError>, ValidateError> {
        match self.registry.lookup(target, method_name) {
            Some(metadata) => collect_inputs_sync(&metadata, args, strategy, mode),
            None => Ok(Vec::new()),
        }
    }

    /// Collects input errors with any strategy.
    pub async fn validate_inputs(
        &self,
        target: &Target,
        method_name: &str,
        args: &[Value],
        strategy: ValidationStrategy,
        mode: ValidationMode,
    ) -> Result<Vec<SchemaValidationError>, ValidateError> {
        match self.registry.lookup(target, method_name) {
            Some(metadata) => collect_inputs(&metadata, args, strategy, mode).await,
            None => Ok(Vec::new()),
        }
    }

    /// Checks a result against the output schema with a synchronous strategy.
    pub fn validate_output_sync(
        &self,
        target: &Target,
        method_name: &str,
        value: &Value,
        strategy: ValidationStrategy,
    ) -> Result<Option<SchemaValidationError>, ValidateError> {
        match self.registry.lookup(target, method_name) {
            Some(metadata) => check_output_sync(&metadata, value, strategy),
            None => Ok(None),
        }
    }

    /// Checks a result against the output schema with any strategy.
    pub async fn validate_output(
        &self,
        target: &Target,
        method_name: &str,
        value: &Value,
        strategy: ValidationStrategy,
    ) -> Result<Option<SchemaValidationError>, ValidateError> {
        match self.registry.lookup(target, method_name) {
            Some(metadata) => check_output(&metadata, value, strategy).await,
            None => Ok(None),
        }
    }

    /// Runs one validated call.
    ///
    /// Metadata and configuration are read at call time, so registrations and
    /// config changes made after wrapping take effect on the next call.
    pub fn dispatch(
        &self,
        method: &MethodFn,
        kind: MethodKind,
        target: &Target,
        method_name: &str,
        args: Vec<Value>,
    ) -> Dispatched {
        let metadata = self.registry.lookup(target, method_name).unwrap_or_default();
        let options = resolve(metadata.options.as_ref(), self);

        if !options.enabled {
            debug!(owner = %target, method = method_name, "Validation disabled, calling through");
            return passthrough(method(args));
        }

        let call = Call {
            target: target.clone(),
            method_name: method_name.to_string(),
            metadata,
            options,
        };

        if kind == MethodKind::Sync && !call.options.needs_async_validation() {
            debug!(owner = %target, method = method_name, path = "sync", "Dispatching validated call");
            return call.run_sync(method, args);
        }

        debug!(owner = %target, method = method_name, path = "async", "Dispatching validated call");
        Dispatched::Pending(call.run(Arc::clone(method), args).boxed())
    }
}

fn resolve(options: Option<&ValidateOptions>, dispatcher: &Dispatcher) -> ResolvedOptions {
    let config = dispatcher.config.get();
    match options {
        Some(options) => options.resolve(&config),
        None => ValidateOptions::default().resolve(&config),
    }
}
