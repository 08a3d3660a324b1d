//! Turning a phase's collected errors into the error the caller sees.

use crate::core::{ValidationKind, ValidationMode, ValidationStrategy};
use crate::errors::{AggregatedValidationError, SchemaValidationError, ValidateError, ValidationFailure};
use crate::options::{OnErrorHook, ResolvedOptions, ValidationContext};
use crate::registry::Target;
use tracing::debug;

/// Where a phase ran and how its failures are reported.
#[derive(Clone, Copy)]
pub struct PhaseScope<'a> {
    /// Owner of the validated method.
    pub target: &'a Target,
    /// Validated method.
    pub method_name: &'a str,
    /// Phase being reported.
    pub kind: ValidationKind,
    /// Strategy the phase ran with.
    pub strategy: ValidationStrategy,
    /// Failure policy of the phase.
    pub mode: ValidationMode,
    /// Optional error mapping hook.
    pub on_error: Option<&'a OnErrorHook>,
}

impl<'a> PhaseScope<'a> {
    /// Builds the scope of one phase from resolved call options.
    #[must_use]
    pub fn new(
        target: &'a Target,
        method_name: &'a str,
        kind: ValidationKind,
        options: &'a ResolvedOptions,
    ) -> Self {
        let strategy = match kind {
            ValidationKind::Input => options.input,
            ValidationKind::Output => options.output,
        };
        Self {
            target,
            method_name,
            kind,
            strategy,
            mode: options.mode,
            on_error: options.on_error.as_ref(),
        }
    }
}

/// Raises the errors a phase collected, if any.
///
/// Under collect-all with more than one error the caller gets an aggregate;
/// otherwise the first error. A hook that returns a replacement wins; a hook
/// that returns `None` leaves the computed error in place.
pub fn raise_phase_errors(
    errors: Vec<SchemaValidationError>,
    scope: &PhaseScope<'_>,
) -> Result<(), ValidateError> {
    let Some(first) = errors.first() else {
        return Ok(());
    };

    let failure = if scope.mode == ValidationMode::CollectAll && errors.len() > 1 {
        ValidationFailure::Aggregated(AggregatedValidationError::new(errors.clone(), scope.kind))
    } else {
        ValidationFailure::Schema(first.clone())
    };

    debug!(
        owner = %scope.target,
        method = scope.method_name,
        kind = %scope.kind,
        strategy = %scope.strategy,
        errors = errors.len(),
        "Validation failed"
    );

    if let Some(hook) = scope.on_error {
        let context = ValidationContext {
            target: scope.target.clone(),
            method_name: scope.method_name.to_string(),
            kind: scope.kind,
            strategy: scope.strategy,
            errors,
        };
        if let Some(mapped) = hook(&failure, &context) {
            debug!(
                owner = %scope.target,
                method = scope.method_name,
                kind = %scope.kind,
                "Validation error replaced by hook"
            );
            return Err(ValidateError::Mapped(mapped));
        }
    }

    Err(failure.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Issue;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Handler;

    fn issue_error(message: &str) -> SchemaValidationError {
        SchemaValidationError::single(Issue::new("custom", message))
    }

    fn scope<'a>(target: &'a Target, mode: ValidationMode, hook: Option<&'a OnErrorHook>) -> PhaseScope<'a> {
        PhaseScope {
            target,
            method_name: "handle",
            kind: ValidationKind::Input,
            strategy: ValidationStrategy::SafeParse,
            mode,
            on_error: hook,
        }
    }

    #[test]
    fn test_no_errors_is_ok() {
        let target = Target::of::<Handler>();
        assert!(raise_phase_errors(Vec::new(), &scope(&target, ValidationMode::CollectAll, None)).is_ok());
    }

    #[test]
    fn test_fail_fast_raises_first_error() {
        let target = Target::of::<Handler>();
        let err = raise_phase_errors(
            vec![issue_error("one"), issue_error("two")],
            &scope(&target, ValidationMode::FailFast, None),
        )
        .unwrap_err();
        assert_eq!(err.as_schema_error().unwrap().issues()[0].message, "one");
    }

    #[test]
    fn test_collect_all_single_error_is_not_aggregated() {
        let target = Target::of::<Handler>();
        let err = raise_phase_errors(
            vec![issue_error("only")],
            &scope(&target, ValidationMode::CollectAll, None),
        )
        .unwrap_err();
        assert!(err.as_schema_error().is_some());
        assert!(err.as_aggregated().is_none());
    }

    #[test]
    fn test_collect_all_aggregates() {
        let target = Target::of::<Handler>();
        let err = raise_phase_errors(
            vec![issue_error("one"), issue_error("two")],
            &scope(&target, ValidationMode::CollectAll, None),
        )
        .unwrap_err();
        let aggregated = err.as_aggregated().unwrap();
        assert_eq!(aggregated.len(), 2);
        assert_eq!(aggregated.kind, ValidationKind::Input);
        assert_eq!(err.to_string(), "Validation failed for input with 2 error(s).");
    }

    #[test]
    fn test_hook_replaces_error_and_sees_context() {
        let target = Target::of::<Handler>();
        let seen = Arc::new(Mutex::new(None));
        let seen_by_hook = Arc::clone(&seen);
        let hook: OnErrorHook = Arc::new(move |failure: &ValidationFailure, context: &ValidationContext| {
            *seen_by_hook.lock() = Some((failure.errors().len(), context.errors.len(), context.strategy));
            Some(anyhow::anyhow!("bad request"))
        });

        let err = raise_phase_errors(
            vec![issue_error("one"), issue_error("two")],
            &scope(&target, ValidationMode::FailFast, Some(&hook)),
        )
        .unwrap_err();

        assert_eq!(err.as_mapped().unwrap().to_string(), "bad request");
        assert_eq!(*seen.lock(), Some((1, 2, ValidationStrategy::SafeParse)));
    }

    #[test]
    fn test_hook_returning_none_keeps_error() {
        let target = Target::of::<Handler>();
        let hook: OnErrorHook = Arc::new(|_, _| None);
        let err = raise_phase_errors(
            vec![issue_error("one")],
            &scope(&target, ValidationMode::FailFast, Some(&hook)),
        )
        .unwrap_err();
        assert!(err.as_schema_error().is_some());
    }
}
