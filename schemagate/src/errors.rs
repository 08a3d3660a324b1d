//! Error types for schemagate.
//!
//! The taxonomy separates failures the dispatcher reshapes (schema issues and
//! their aggregates) from failures it only forwards (wrapped method errors,
//! schema faults, and replacement errors produced by an `on_error` hook).

use crate::core::{ValidationKind, ValidationStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type returned by validated calls.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A single schema check failed.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// Several checks of one phase failed under collect-all mode.
    #[error(transparent)]
    Aggregated(#[from] AggregatedValidationError),

    /// The replacement error returned by an `on_error` hook.
    #[error(transparent)]
    Mapped(anyhow::Error),

    /// A synchronous validation was attempted with an asynchronous strategy.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A schema failed for a reason other than invalid input.
    #[error(transparent)]
    SchemaFault(anyhow::Error),

    /// The wrapped method itself failed.
    #[error(transparent)]
    Method(anyhow::Error),
}

impl ValidateError {
    /// Returns true for schema and aggregated validation failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Aggregated(_))
    }

    /// Returns the single schema error, if this is one.
    #[must_use]
    pub fn as_schema_error(&self) -> Option<&SchemaValidationError> {
        match self {
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the aggregated error, if this is one.
    #[must_use]
    pub fn as_aggregated(&self) -> Option<&AggregatedValidationError> {
        match self {
            Self::Aggregated(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the hook-provided replacement error, if this is one.
    #[must_use]
    pub fn as_mapped(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Mapped(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the wrapped method's own error, if this is one.
    #[must_use]
    pub fn as_method_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Method(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for ValidateError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::Schema(err) => Self::Schema(err),
            ValidationFailure::Aggregated(err) => Self::Aggregated(err),
        }
    }
}

/// One step in the path to an offending field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object field access.
    Key(String),
    /// Array element access.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single problem reported by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Steps from the validated value to the offending field.
    #[serde(default)]
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
    /// Machine-readable code (e.g. `invalid_type`).
    pub code: String,
}

impl Issue {
    /// Creates an issue at the root of the validated value.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// Sets the path of the issue.
    #[must_use]
    pub fn at<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Prepends a segment, for issues bubbling up from a nested value.
    #[must_use]
    pub fn under(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// Renders the path as `address.city` or `items[0].name`.
    #[must_use]
    pub fn path_string(&self) -> String {
        let mut rendered = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !rendered.is_empty() {
                        rendered.push('.');
                    }
                    rendered.push_str(key);
                }
                PathSegment::Index(index) => {
                    rendered.push('[');
                    rendered.push_str(&index.to_string());
                    rendered.push(']');
                }
            }
        }
        rendered
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} ({})", self.message, self.code)
        } else {
            write!(f, "{}: {} ({})", self.path_string(), self.message, self.code)
        }
    }
}

/// Structured failure of one schema check. Always holds at least one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaValidationError {
    issues: Vec<Issue>,
}

impl SchemaValidationError {
    /// Creates an error from the issues a schema reported.
    ///
    /// An empty list is replaced by a single root-level `custom` issue.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            return Self::single(Issue::new("custom", "Invalid input"));
        }
        Self { issues }
    }

    /// Creates an error carrying exactly one issue.
    #[must_use]
    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Returns the ordered issues.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns the first issue.
    #[must_use]
    pub fn first_issue(&self) -> Option<&Issue> {
        self.issues.first()
    }

    /// Returns true if any issue points at the given dotted path.
    #[must_use]
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path_string() == path)
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema validation failed: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

/// Every failure of one phase, produced only under collect-all mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for {kind} with {} error(s).", .errors.len())]
pub struct AggregatedValidationError {
    /// The underlying schema errors in evaluation order.
    pub errors: Vec<SchemaValidationError>,
    /// The phase that failed.
    pub kind: ValidationKind,
}

impl AggregatedValidationError {
    /// Creates a new aggregated error.
    #[must_use]
    pub fn new(errors: Vec<SchemaValidationError>, kind: ValidationKind) -> Self {
        Self { errors, kind }
    }

    /// Returns the number of underlying errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no underlying errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Misuse of the synchronous validation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Async validation strategy \"{strategy}\" requires an async validation path.")]
pub struct ConfigurationError {
    /// The strategy that was requested.
    pub strategy: ValidationStrategy,
}

/// The phase error handed to an `on_error` hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// A single schema error.
    #[error(transparent)]
    Schema(SchemaValidationError),
    /// An aggregate of several schema errors.
    #[error(transparent)]
    Aggregated(AggregatedValidationError),
}

impl ValidationFailure {
    /// Returns the underlying schema errors.
    #[must_use]
    pub fn errors(&self) -> &[SchemaValidationError] {
        match self {
            Self::Schema(err) => std::slice::from_ref(err),
            Self::Aggregated(err) => &err.errors,
        }
    }
}
