//! Per-method validation options and their resolution against configuration.

use crate::config::ValidationConfig;
use crate::core::{ValidationKind, ValidationMode, ValidationStrategy};
use crate::errors::{SchemaValidationError, ValidationFailure};
use crate::registry::Target;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Hook that may replace a phase error.
///
/// Returning `None` keeps the original error.
pub type OnErrorHook =
    Arc<dyn Fn(&ValidationFailure, &ValidationContext) -> Option<anyhow::Error> + Send + Sync>;

/// Snapshot handed to an [`OnErrorHook`].
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// The validated target.
    pub target: Target,
    /// The validated method.
    pub method_name: String,
    /// The failing phase.
    pub kind: ValidationKind,
    /// The strategy used for the phase.
    pub strategy: ValidationStrategy,
    /// Every structured error collected for the phase, in order.
    pub errors: Vec<SchemaValidationError>,
}

/// Per-method override of the configured defaults.
///
/// Unset fields fall back to the process configuration at call time.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOptions {
    /// Strategy for parameter and group checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ValidationStrategy>,
    /// Strategy for the output check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ValidationStrategy>,
    /// Whether inputs are validated (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_inputs: Option<bool>,
    /// Whether the output is validated (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_outputs: Option<bool>,
    /// Failure policy inside a phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ValidationMode>,
    /// Master switch; `false` makes the wrapper transparent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Error mapping hook.
    #[serde(skip)]
    pub on_error: Option<OnErrorHook>,
}

impl ValidateOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input strategy.
    #[must_use]
    pub fn input(mut self, strategy: ValidationStrategy) -> Self {
        self.input = Some(strategy);
        self
    }

    /// Sets the output strategy.
    #[must_use]
    pub fn output(mut self, strategy: ValidationStrategy) -> Self {
        self.output = Some(strategy);
        self
    }

    /// Enables or disables input validation.
    #[must_use]
    pub fn validate_inputs(mut self, validate: bool) -> Self {
        self.validate_inputs = Some(validate);
        self
    }

    /// Enables or disables output validation.
    #[must_use]
    pub fn validate_outputs(mut self, validate: bool) -> Self {
        self.validate_outputs = Some(validate);
        self
    }

    /// Sets the failure mode.
    #[must_use]
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Enables or disables validation for the method.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Installs an error mapping hook.
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ValidationFailure, &ValidationContext) -> Option<anyhow::Error> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Resolves against a configuration snapshot.
    #[must_use]
    pub fn resolve(&self, config: &ValidationConfig) -> ResolvedOptions {
        ResolvedOptions {
            input: self.input.unwrap_or(config.default_input_strategy),
            output: self.output.unwrap_or(config.default_output_strategy),
            validate_inputs: self.validate_inputs.unwrap_or(true),
            validate_outputs: self.validate_outputs.unwrap_or(true),
            mode: self.mode.unwrap_or(config.default_mode),
            enabled: self.enabled.unwrap_or_else(|| config.effective_enabled()),
            on_error: self.on_error.clone(),
        }
    }
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("validate_inputs", &self.validate_inputs)
            .field("validate_outputs", &self.validate_outputs)
            .field("mode", &self.mode)
            .field("enabled", &self.enabled)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Fully resolved options for one call.
#[derive(Clone)]
pub struct ResolvedOptions {
    /// Input strategy.
    pub input: ValidationStrategy,
    /// Output strategy.
    pub output: ValidationStrategy,
    /// Whether inputs are validated.
    pub validate_inputs: bool,
    /// Whether the output is validated.
    pub validate_outputs: bool,
    /// Failure mode.
    pub mode: ValidationMode,
    /// Whether validation runs at all.
    pub enabled: bool,
    /// Error mapping hook.
    pub on_error: Option<OnErrorHook>,
}

impl ResolvedOptions {
    /// Returns true if some enabled phase uses an asynchronous strategy.
    #[must_use]
    pub fn needs_async_validation(&self) -> bool {
        (self.validate_inputs && self.input.is_async())
            || (self.validate_outputs && self.output.is_async())
    }
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("validate_inputs", &self.validate_inputs)
            .field("validate_outputs", &self.validate_outputs)
            .field("mode", &self.mode)
            .field("enabled", &self.enabled)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
