//! The schema capability and the strategy-driven adapter over it.
//!
//! Schemagate does not implement a schema language. Any validation engine can
//! be plugged in by implementing [`Schema`], or by wrapping a closure in
//! [`FnSchema`] / [`AsyncFnSchema`].

mod closures;
mod validate;

pub use closures::{AsyncFnSchema, FnSchema};
pub use validate::{validate_schema, validate_schema_sync};

use crate::errors::SchemaValidationError;
use async_trait::async_trait;
use serde_json::Value;

/// Failure of a throwing parse.
#[derive(Debug)]
pub enum ParseError {
    /// The value does not satisfy the schema.
    Invalid(SchemaValidationError),
    /// The schema could not run at all. Never treated as a validation failure.
    Fault(anyhow::Error),
}

impl ParseError {
    /// Creates a fault from any error.
    pub fn fault(err: impl Into<anyhow::Error>) -> Self {
        Self::Fault(err.into())
    }
}

impl From<SchemaValidationError> for ParseError {
    fn from(err: SchemaValidationError) -> Self {
        Self::Invalid(err)
    }
}

/// Outcome of a non-throwing parse.
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse {
    /// The parsed value.
    Success(Value),
    /// The structured failure.
    Failure(SchemaValidationError),
}

impl SafeParse {
    /// Returns true on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Drops the parsed value and keeps only the failure, if any.
    #[must_use]
    pub fn into_error(self) -> Option<SchemaValidationError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }
}

/// A validation engine for one shape of value.
///
/// Only [`Schema::parse`] is required. The non-throwing and asynchronous
/// forms default to it with identical success and failure semantics.
#[async_trait]
pub trait Schema: Send + Sync {
    /// Parses a value, failing with a structured error when it is invalid.
    fn parse(&self, value: &Value) -> Result<Value, ParseError>;

    /// Parses a value, reporting invalid input in the result.
    ///
    /// Faults still surface as `Err`.
    fn safe_parse(&self, value: &Value) -> anyhow::Result<SafeParse> {
        match self.parse(value) {
            Ok(parsed) => Ok(SafeParse::Success(parsed)),
            Err(ParseError::Invalid(err)) => Ok(SafeParse::Failure(err)),
            Err(ParseError::Fault(err)) => Err(err),
        }
    }

    /// Asynchronous form of [`Schema::parse`].
    async fn parse_async(&self, value: &Value) -> Result<Value, ParseError> {
        self.parse(value)
    }

    /// Asynchronous form of [`Schema::safe_parse`].
    async fn safe_parse_async(&self, value: &Value) -> anyhow::Result<SafeParse> {
        self.safe_parse(value)
    }

    /// Returns a diagnostic name for the schema.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
