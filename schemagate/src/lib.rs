//! # Schemagate
//!
//! Runtime validation around method calls.
//!
//! Schemagate binds externally defined schemas to a method's parameters,
//! to groups of parameters, and to its return value, and checks them on
//! every call:
//!
//! - **Metadata registry**: per target and method, which positions, groups
//!   and outputs are validated and with which options
//! - **Dispatcher**: runs input checks, the method, then the output check,
//!   staying synchronous when nothing in the call needs to suspend
//! - **Failure policy**: fail-fast or collect-all, with an optional hook that
//!   replaces the raised error
//! - **Configuration**: a process-wide switch with an environment override
//!   and default strategies
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemagate::prelude::*;
//!
//! let create = MethodBuilder::for_type::<UserService>("create")
//!     .param(0, user_schema)
//!     .options(ValidateOptions::new().mode(ValidationMode::CollectAll))
//!     .wrap_sync(|args| service.create(&args[0]));
//!
//! let user = create.call(vec![json!({"name": "John", "age": 20})]).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapters;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod errors;
pub mod format;
pub mod method;
pub mod observability;
pub mod options;
pub mod registry;
pub mod schema;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::{RequestParts, RequestSource, RequestValidator, ValidationPipe};
    pub use crate::config::{
        get_validation_config, is_validation_enabled, reset_validation_config,
        set_validation_config, ConfigStore, ValidationConfig, ValidationConfigPatch,
    };
    pub use crate::core::{MethodKind, ValidationKind, ValidationMode, ValidationStrategy};
    pub use crate::dispatcher::{Dispatched, Dispatcher, MethodReturn, ValidatedMethod};
    pub use crate::errors::{
        AggregatedValidationError, ConfigurationError, Issue, PathSegment,
        SchemaValidationError, ValidateError, ValidationFailure,
    };
    pub use crate::format::{format_aggregated_error, format_schema_error};
    pub use crate::method::MethodBuilder;
    pub use crate::options::{ValidateOptions, ValidationContext};
    pub use crate::registry::{get_validation_metadata, MetadataRegistry, MethodSummary, Target};
    pub use crate::schema::{AsyncFnSchema, FnSchema, ParseError, SafeParse, Schema};
}
