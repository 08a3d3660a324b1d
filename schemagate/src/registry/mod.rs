//! Metadata registry for validated methods.
//!
//! This module provides:
//! - Target identity for registry keys
//! - Per-method parameter, group, output and options metadata
//! - Introspection summaries

mod metadata;
mod target;

pub use metadata::{
    get_validation_metadata, MetadataRegistry, MethodMetadata, MethodSummary, ParameterGroup,
    REGISTRY,
};
pub use target::Target;
