//! Testing utilities for validated methods.
//!
//! This module provides:
//! - A template-driven shape schema and simple predicate schemas
//! - Isolated dispatchers with their own registry and configuration
//! - Assertions over call results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_aggregated, assert_issue_at, assert_mapped, assert_method_error, assert_passed,
    assert_schema_error,
};
pub use fixtures::{isolated_dispatcher, isolated_dispatcher_with, ShapeSchema, ISOLATED_ENV_VAR};
pub use mocks::{
    accept_all, non_empty_string, positive_number, reject_all, CountingSchema,
};
