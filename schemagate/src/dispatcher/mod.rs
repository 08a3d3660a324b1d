//! Validation dispatch around wrapped methods.
//!
//! This module provides:
//! - The [`Dispatcher`] that runs input, method and output steps
//! - [`ValidatedMethod`] handles produced by registration
//! - Call and return shapes for sync and async methods
//! - Phase error raising shared with the adapters

mod engine;
mod invocation;
mod phase;
mod wrapped;

pub use engine::Dispatcher;
pub use invocation::{Dispatched, MethodFn, MethodFuture, MethodReturn};
pub use phase::{raise_phase_errors, PhaseScope};
pub use wrapped::ValidatedMethod;
