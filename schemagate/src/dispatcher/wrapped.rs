//! A method bound to its validation metadata.

use super::engine::Dispatcher;
use super::invocation::{Dispatched, MethodFn};
use crate::core::MethodKind;
use crate::registry::Target;
use serde_json::Value;
use std::fmt;

/// A method whose calls pass through the dispatcher.
///
/// Cloning is cheap; clones share the method and the dispatcher.
#[derive(Clone)]
pub struct ValidatedMethod {
    dispatcher: Dispatcher,
    target: Target,
    method_name: String,
    kind: MethodKind,
    method: MethodFn,
}

impl ValidatedMethod {
    /// Binds a method to a dispatcher.
    #[must_use]
    pub fn new(
        dispatcher: Dispatcher,
        target: Target,
        method_name: impl Into<String>,
        kind: MethodKind,
        method: MethodFn,
    ) -> Self {
        Self {
            dispatcher,
            target,
            method_name: method_name.into(),
            kind,
            method,
        }
    }

    /// Calls the method with validation applied.
    pub fn call(&self, args: Vec<Value>) -> Dispatched {
        self.dispatcher
            .dispatch(&self.method, self.kind, &self.target, &self.method_name, args)
    }

    /// Returns the owning target.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Returns the method name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns whether the wrapped method is synchronous.
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Returns the dispatcher the method runs through.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl fmt::Debug for ValidatedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedMethod")
            .field("target", &self.target)
            .field("method_name", &self.method_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
