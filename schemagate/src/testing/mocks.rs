//! Ready-made schemas for tests.

use crate::errors::{Issue, SchemaValidationError};
use crate::schema::{FnSchema, ParseError, SafeParse, Schema};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

fn invalid(code: &str, message: &str) -> ParseError {
    ParseError::Invalid(SchemaValidationError::single(Issue::new(code, message)))
}

/// A schema that accepts every value.
pub fn accept_all(name: &str) -> impl Schema {
    FnSchema::new(name, |value: &Value| -> Result<Value, ParseError> {
        Ok(value.clone())
    })
}

/// A schema that rejects every value with one `custom` issue.
pub fn reject_all(name: &str, message: &str) -> impl Schema {
    let message = message.to_string();
    FnSchema::new(name, move |_: &Value| -> Result<Value, ParseError> {
        Err(invalid("custom", &message))
    })
}

/// A schema accepting only strings with at least one character.
pub fn non_empty_string(name: &str) -> impl Schema {
    FnSchema::new(name, |value: &Value| -> Result<Value, ParseError> {
        match value.as_str() {
            None => Err(invalid("invalid_type", "Expected string")),
            Some("") => Err(invalid("too_small", "String must contain at least 1 character(s)")),
            Some(_) => Ok(value.clone()),
        }
    })
}

/// A schema accepting only numbers greater than zero.
pub fn positive_number(name: &str) -> impl Schema {
    FnSchema::new(name, |value: &Value| -> Result<Value, ParseError> {
        match value.as_f64() {
            None => Err(invalid("invalid_type", "Expected number")),
            Some(n) if n <= 0.0 => Err(invalid("too_small", "Number must be greater than 0")),
            Some(_) => Ok(value.clone()),
        }
    })
}

/// Wraps a schema and counts how often each capability is used.
#[derive(Debug)]
pub struct CountingSchema<S> {
    inner: S,
    sync_calls: AtomicUsize,
    async_calls: AtomicUsize,
}

impl<S: Schema> CountingSchema<S> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            sync_calls: AtomicUsize::new(0),
            async_calls: AtomicUsize::new(0),
        }
    }

    /// Returns the number of synchronous invocations.
    #[must_use]
    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of asynchronous invocations.
    #[must_use]
    pub fn async_calls(&self) -> usize {
        self.async_calls.load(Ordering::SeqCst)
    }

    /// Returns the total number of invocations.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.sync_calls() + self.async_calls()
    }
}

#[async_trait]
impl<S: Schema> Schema for CountingSchema<S> {
    fn parse(&self, value: &Value) -> Result<Value, ParseError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parse(value)
    }

    fn safe_parse(&self, value: &Value) -> anyhow::Result<SafeParse> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.safe_parse(value)
    }

    async fn parse_async(&self, value: &Value) -> Result<Value, ParseError> {
        self.async_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parse_async(value).await
    }

    async fn safe_parse_async(&self, value: &Value) -> anyhow::Result<SafeParse> {
        self.async_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.safe_parse_async(value).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
