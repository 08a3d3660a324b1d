//! Adapters that reuse validation outside of wrapped methods.
//!
//! Both adapters run a single schema through the same strategy handling and
//! phase error raising as the dispatcher, without registering anything.

use crate::core::{ValidationKind, ValidationMode, ValidationStrategy};
use crate::dispatcher::{raise_phase_errors, PhaseScope};
use crate::errors::{ValidateError, ValidationFailure};
use crate::options::{OnErrorHook, ValidationContext};
use crate::registry::Target;
use crate::schema::{validate_schema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Method name reported to hooks for request validation.
pub const REQUEST_METHOD_NAME: &str = "request";

/// The part of a request a [`RequestValidator`] checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    /// The decoded body.
    #[default]
    Body,
    /// The decoded query string.
    Query,
    /// Route parameters.
    Params,
}

impl RequestSource {
    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Params => "params",
        }
    }
}

impl fmt::Display for RequestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded parts of an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParts {
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Route parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestParts {
    /// Creates empty request parts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the route parameters.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Returns one part; an absent part reads as `null`.
    #[must_use]
    pub fn get(&self, source: RequestSource) -> Value {
        let part = match source {
            RequestSource::Body => &self.body,
            RequestSource::Query => &self.query,
            RequestSource::Params => &self.params,
        };
        part.clone().unwrap_or(Value::Null)
    }
}

/// Validates one part of a request before it reaches a handler.
#[derive(Clone)]
pub struct RequestValidator {
    schema: Arc<dyn Schema>,
    source: RequestSource,
    strategy: ValidationStrategy,
    mode: ValidationMode,
    on_error: Option<OnErrorHook>,
    target: Target,
}

impl RequestValidator {
    /// Creates a validator for the request body using `parse`.
    #[must_use]
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        Self {
            schema,
            source: RequestSource::default(),
            strategy: ValidationStrategy::Parse,
            mode: ValidationMode::FailFast,
            on_error: None,
            target: Target::named(REQUEST_METHOD_NAME),
        }
    }

    /// Selects the request part to validate.
    #[must_use]
    pub fn source(mut self, source: RequestSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Installs an error mapping hook.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ValidationFailure, &ValidationContext) -> Option<anyhow::Error> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Validates the selected part of `request`.
    pub async fn validate(&self, request: &RequestParts) -> Result<(), ValidateError> {
        let value = request.get(self.source);
        let error = validate_schema(self.schema.as_ref(), &value, self.strategy).await?;
        let scope = PhaseScope {
            target: &self.target,
            method_name: REQUEST_METHOD_NAME,
            kind: ValidationKind::Input,
            strategy: self.strategy,
            mode: self.mode,
            on_error: self.on_error.as_ref(),
        };
        raise_phase_errors(error.into_iter().collect(), &scope)
    }

    /// Validates `request` and hands the outcome to `next`.
    ///
    /// `next` receives `None` when the request passed and the error otherwise.
    pub async fn handle<F, R>(&self, request: &RequestParts, next: F) -> R
    where
        F: FnOnce(Option<ValidateError>) -> R,
    {
        next(self.validate(request).await.err())
    }
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidator")
            .field("schema", &self.schema.name())
            .field("source", &self.source)
            .field("strategy", &self.strategy)
            .field("mode", &self.mode)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Validates values handed to it and passes them through unchanged.
#[derive(Clone)]
pub struct ValidationPipe {
    schema: Arc<dyn Schema>,
    strategy: ValidationStrategy,
    mode: ValidationMode,
    target: Target,
}

impl ValidationPipe {
    /// Creates a pipe using `parse`.
    #[must_use]
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        Self {
            schema,
            strategy: ValidationStrategy::Parse,
            mode: ValidationMode::FailFast,
            target: Target::named("pipe"),
        }
    }

    /// Sets the strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns `value` if it is valid.
    pub async fn transform(&self, value: Value) -> Result<Value, ValidateError> {
        let error = validate_schema(self.schema.as_ref(), &value, self.strategy).await?;
        let scope = PhaseScope {
            target: &self.target,
            method_name: "transform",
            kind: ValidationKind::Input,
            strategy: self.strategy,
            mode: self.mode,
            on_error: None,
        };
        raise_phase_errors(error.into_iter().collect(), &scope)?;
        Ok(value)
    }
}

impl fmt::Debug for ValidationPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPipe")
            .field("schema", &self.schema.name())
            .field("strategy", &self.strategy)
            .field("mode", &self.mode)
            .finish()
    }
}
