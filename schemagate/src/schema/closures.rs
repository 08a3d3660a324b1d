//! Closure-backed schemas.

use super::{ParseError, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

/// A schema backed by a synchronous closure.
pub struct FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync,
{
    /// Creates a new closure schema.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSchema").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, ParseError> + Send + Sync,
{
    fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        (self.func)(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A schema that can only be evaluated asynchronously.
///
/// The synchronous forms fault instead of blocking, so using this schema
/// with `parse` or `safe_parse` surfaces a schema fault.
pub struct AsyncFnSchema<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ParseError>> + Send + 'static,
{
    name: String,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnSchema<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ParseError>> + Send + 'static,
{
    /// Creates a new asynchronous closure schema.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnSchema<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ParseError>> + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnSchema")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Schema for AsyncFnSchema<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ParseError>> + Send + 'static,
{
    fn parse(&self, _value: &Value) -> Result<Value, ParseError> {
        Err(ParseError::fault(anyhow::anyhow!(
            "schema '{}' contains asynchronous checks and cannot be parsed synchronously",
            self.name
        )))
    }

    async fn parse_async(&self, value: &Value) -> Result<Value, ParseError> {
        (self.func)(value.clone()).await
    }

    async fn safe_parse_async(&self, value: &Value) -> anyhow::Result<super::SafeParse> {
        match (self.func)(value.clone()).await {
            Ok(parsed) => Ok(super::SafeParse::Success(parsed)),
            Err(ParseError::Invalid(err)) => Ok(super::SafeParse::Failure(err)),
            Err(ParseError::Fault(err)) => Err(err),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Issue, SchemaValidationError};
    use crate::schema::SafeParse;
    use serde_json::json;

    fn non_empty() -> FnSchema<impl Fn(&Value) -> Result<Value, ParseError> + Send + Sync> {
        FnSchema::new("non_empty", |value: &Value| match value.as_str() {
            Some(s) if !s.is_empty() => Ok(value.clone()),
            _ => Err(SchemaValidationError::single(Issue::new("too_small", "Must not be empty")).into()),
        })
    }

    #[test]
    fn test_fn_schema_parse() {
        let schema = non_empty();
        assert_eq!(schema.name(), "non_empty");
        assert_eq!(schema.parse(&json!("ok")).unwrap(), json!("ok"));
        assert!(matches!(schema.parse(&json!("")), Err(ParseError::Invalid(_))));
    }

    #[test]
    fn test_fn_schema_safe_parse_defaults() {
        let schema = non_empty();
        assert!(schema.safe_parse(&json!("ok")).unwrap().is_success());

        let failed = schema.safe_parse(&json!("")).unwrap();
        assert!(failed.into_error().is_some());
    }

    #[tokio::test]
    async fn test_fn_schema_async_defaults() {
        let schema = non_empty();
        assert!(schema.parse_async(&json!("ok")).await.is_ok());
        let result = schema.safe_parse_async(&json!("")).await.unwrap();
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_async_fn_schema() {
        let schema = AsyncFnSchema::new("is_ok", |value: Value| async move {
            if value == json!("ok") {
                Ok(value)
            } else {
                Err(ParseError::Invalid(SchemaValidationError::single(Issue::new(
                    "custom", "not ok",
                ))))
            }
        });

        assert!(schema.parse_async(&json!("ok")).await.is_ok());
        assert!(matches!(
            schema.safe_parse_async(&json!("nope")).await.unwrap(),
            SafeParse::Failure(_)
        ));
        assert!(matches!(schema.parse(&json!("ok")), Err(ParseError::Fault(_))));
        assert!(schema.safe_parse(&json!("ok")).is_err());
    }
}
