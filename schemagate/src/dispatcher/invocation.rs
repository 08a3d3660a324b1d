//! Call and return shapes for wrapped methods.

use crate::errors::ValidateError;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::Arc;

/// A wrapped method's pending computation.
pub type MethodFuture = BoxFuture<'static, anyhow::Result<Value>>;

/// The callable installed behind a validated method.
///
/// An `Err` is a failure raised before the method produced anything.
pub type MethodFn = Arc<dyn Fn(Vec<Value>) -> anyhow::Result<MethodReturn> + Send + Sync>;

/// What a wrapped method hands back.
pub enum MethodReturn {
    /// An immediate value.
    Ready(Value),
    /// A computation that resolves later.
    Pending(MethodFuture),
}

impl MethodReturn {
    /// Wraps a future as a pending return.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }
}

impl fmt::Debug for MethodReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// The outcome of a validated call.
///
/// The fully synchronous path yields `Ready` without suspending; every other
/// path yields `Pending`. Both can be awaited.
pub enum Dispatched {
    /// Completed in the caller's turn.
    Ready(Result<Value, ValidateError>),
    /// Completes when awaited.
    Pending(BoxFuture<'static, Result<Value, ValidateError>>),
}

impl Dispatched {
    /// Returns true if the call has not completed yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Returns the result of a call that completed synchronously.
    #[must_use]
    pub fn into_ready(self) -> Option<Result<Value, ValidateError>> {
        match self {
            Self::Ready(result) => Some(result),
            Self::Pending(_) => None,
        }
    }
}

impl IntoFuture for Dispatched {
    type Output = Result<Value, ValidateError>;
    type IntoFuture = BoxFuture<'static, Result<Value, ValidateError>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(result) => futures::future::ready(result).boxed(),
            Self::Pending(future) => future,
        }
    }
}

impl fmt::Debug for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ready_dispatch_can_be_awaited() {
        let dispatched = Dispatched::Ready(Ok(json!(1)));
        assert!(!dispatched.is_pending());
        assert_eq!(dispatched.await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_pending_dispatch() {
        let dispatched = Dispatched::Pending(async { Ok(json!("later")) }.boxed());
        assert!(dispatched.is_pending());
        assert_eq!(format!("{dispatched:?}"), "Pending(..)");
        assert_eq!(dispatched.await.unwrap(), json!("later"));
    }

    #[test]
    fn test_into_ready() {
        assert!(Dispatched::Ready(Ok(json!(null))).into_ready().is_some());
        let pending = Dispatched::Pending(async { Ok(json!(null)) }.boxed());
        assert!(pending.into_ready().is_none());
    }

    #[test]
    fn test_method_return_pending_polls_with_tokio_test() {
        let ret = MethodReturn::pending(async { Ok(json!(5)) });
        let MethodReturn::Pending(future) = ret else {
            panic!("expected pending return");
        };
        assert_eq!(tokio_test::block_on(future).unwrap(), json!(5));
    }
}
