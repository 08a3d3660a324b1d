//! Strategy-driven schema invocation.
//!
//! Both entry points reduce a schema run to "no error" or one structured
//! error. Parsed values are discarded: validation gates a value, it never
//! replaces it.

use super::{ParseError, Schema};
use crate::core::ValidationStrategy;
use crate::errors::{ConfigurationError, SchemaValidationError, ValidateError};
use serde_json::Value;

fn from_parse(result: Result<Value, ParseError>) -> Result<Option<SchemaValidationError>, ValidateError> {
    match result {
        Ok(_) => Ok(None),
        Err(ParseError::Invalid(err)) => Ok(Some(err)),
        Err(ParseError::Fault(err)) => Err(ValidateError::SchemaFault(err)),
    }
}

/// Runs a schema synchronously.
///
/// Asynchronous strategies are rejected with a [`ConfigurationError`]
/// before the schema is touched.
pub fn validate_schema_sync(
    schema: &dyn Schema,
    value: &Value,
    strategy: ValidationStrategy,
) -> Result<Option<SchemaValidationError>, ValidateError> {
    match strategy {
        ValidationStrategy::SafeParse => schema
            .safe_parse(value)
            .map(super::SafeParse::into_error)
            .map_err(ValidateError::SchemaFault),
        ValidationStrategy::Parse => from_parse(schema.parse(value)),
        ValidationStrategy::ParseAsync | ValidationStrategy::SafeParseAsync => {
            Err(ConfigurationError { strategy }.into())
        }
    }
}

/// Runs a schema under any strategy, awaiting asynchronous ones.
pub async fn validate_schema(
    schema: &dyn Schema,
    value: &Value,
    strategy: ValidationStrategy,
) -> Result<Option<SchemaValidationError>, ValidateError> {
    match strategy {
        ValidationStrategy::SafeParse => schema
            .safe_parse(value)
            .map(super::SafeParse::into_error)
            .map_err(ValidateError::SchemaFault),
        ValidationStrategy::SafeParseAsync => schema
            .safe_parse_async(value)
            .await
            .map(super::SafeParse::into_error)
            .map_err(ValidateError::SchemaFault),
        ValidationStrategy::ParseAsync => from_parse(schema.parse_async(value).await),
        ValidationStrategy::Parse => from_parse(schema.parse(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Issue;
    use crate::schema::{AsyncFnSchema, FnSchema};
    use serde_json::json;

    fn number_schema() -> FnSchema<impl Fn(&Value) -> Result<Value, ParseError> + Send + Sync> {
        FnSchema::new("number", |value: &Value| {
            if value.is_number() {
                Ok(value.clone())
            } else {
                Err(ParseError::Invalid(SchemaValidationError::single(Issue::new(
                    "invalid_type",
                    "Expected number",
                ))))
            }
        })
    }

    fn faulty_schema() -> FnSchema<impl Fn(&Value) -> Result<Value, ParseError> + Send + Sync> {
        FnSchema::new("faulty", |_value: &Value| {
            Err(ParseError::fault(anyhow::anyhow!("engine crashed")))
        })
    }

    #[test]
    fn test_sync_parse_and_safe_parse() {
        let schema = number_schema();
        for strategy in [ValidationStrategy::Parse, ValidationStrategy::SafeParse] {
            assert!(validate_schema_sync(&schema, &json!(1), strategy).unwrap().is_none());
            let err = validate_schema_sync(&schema, &json!("1"), strategy)
                .unwrap()
                .unwrap();
            assert_eq!(err.issues()[0].code, "invalid_type");
        }
    }

    #[test]
    fn test_sync_rejects_async_strategies() {
        let schema = number_schema();
        for strategy in [ValidationStrategy::ParseAsync, ValidationStrategy::SafeParseAsync] {
            let err = validate_schema_sync(&schema, &json!(1), strategy).unwrap_err();
            assert!(matches!(err, ValidateError::Configuration(c) if c.strategy == strategy));
        }
    }

    #[test]
    fn test_sync_fault_propagates() {
        let schema = faulty_schema();
        let err = validate_schema_sync(&schema, &json!(1), ValidationStrategy::Parse).unwrap_err();
        assert!(matches!(err, ValidateError::SchemaFault(_)));
        assert_eq!(err.to_string(), "engine crashed");

        let err = validate_schema_sync(&schema, &json!(1), ValidationStrategy::SafeParse).unwrap_err();
        assert!(matches!(err, ValidateError::SchemaFault(_)));
    }

    #[tokio::test]
    async fn test_async_accepts_every_strategy() {
        let schema = number_schema();
        for strategy in [
            ValidationStrategy::Parse,
            ValidationStrategy::SafeParse,
            ValidationStrategy::ParseAsync,
            ValidationStrategy::SafeParseAsync,
        ] {
            assert!(validate_schema(&schema, &json!(2), strategy).await.unwrap().is_none());
            assert!(validate_schema(&schema, &json!(null), strategy).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_async_schema_is_awaited() {
        let schema = AsyncFnSchema::new("is_ok", |value: Value| async move {
            tokio::task::yield_now().await;
            if value == json!("ok") {
                Ok(value)
            } else {
                Err(ParseError::Invalid(SchemaValidationError::single(Issue::new(
                    "custom", "not ok",
                ))))
            }
        });

        let ok = validate_schema(&schema, &json!("ok"), ValidationStrategy::ParseAsync).await;
        assert!(ok.unwrap().is_none());

        let failed = validate_schema(&schema, &json!("nope"), ValidationStrategy::SafeParseAsync).await;
        assert_eq!(failed.unwrap().unwrap().issues()[0].message, "not ok");

        // A synchronous strategy on an async-only schema is a fault, not a failure.
        let fault = validate_schema(&schema, &json!("ok"), ValidationStrategy::Parse).await;
        assert!(matches!(fault, Err(ValidateError::SchemaFault(_))));
    }
}
