//! Test assertions for validated calls.

use crate::errors::{AggregatedValidationError, SchemaValidationError, ValidateError};
use serde_json::Value;

/// Asserts that the call succeeded and returns its value.
pub fn assert_passed(result: Result<Value, ValidateError>) -> Value {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected success, got error: {err:?}"),
    }
}

/// Asserts that the call failed with a single schema error and returns it.
pub fn assert_schema_error(result: &Result<Value, ValidateError>) -> &SchemaValidationError {
    match result {
        Err(ValidateError::Schema(err)) => err,
        other => panic!("Expected a schema validation error, got: {other:?}"),
    }
}

/// Asserts that the call failed with an aggregate of `len` errors and returns it.
pub fn assert_aggregated(
    result: &Result<Value, ValidateError>,
    len: usize,
) -> &AggregatedValidationError {
    match result {
        Err(ValidateError::Aggregated(err)) => {
            assert_eq!(err.len(), len, "Expected {len} aggregated errors, got {}", err.len());
            err
        }
        other => panic!("Expected an aggregated validation error, got: {other:?}"),
    }
}

/// Asserts that some issue of the single schema error sits at `path`.
pub fn assert_issue_at(result: &Result<Value, ValidateError>, path: &str) {
    let err = assert_schema_error(result);
    assert!(
        err.has_issue_at(path),
        "Expected an issue at '{}', got paths: {:?}",
        path,
        err.issues().iter().map(|issue| issue.path_string()).collect::<Vec<_>>()
    );
}

/// Asserts that the hook's replacement error was raised and returns it.
pub fn assert_mapped(result: &Result<Value, ValidateError>) -> &anyhow::Error {
    match result {
        Err(ValidateError::Mapped(err)) => err,
        other => panic!("Expected a mapped error, got: {other:?}"),
    }
}

/// Asserts that the wrapped method's own error came through and returns it.
pub fn assert_method_error(result: &Result<Value, ValidateError>) -> &anyhow::Error {
    match result {
        Err(ValidateError::Method(err)) => err,
        other => panic!("Expected the method's own error, got: {other:?}"),
    }
}
