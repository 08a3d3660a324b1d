//! Validation strategy, mode and phase enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a schema is invoked for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationStrategy {
    /// Throwing synchronous parse.
    Parse,
    /// Non-throwing synchronous parse.
    SafeParse,
    /// Throwing asynchronous parse.
    ParseAsync,
    /// Non-throwing asynchronous parse.
    SafeParseAsync,
}

impl Default for ValidationStrategy {
    fn default() -> Self {
        Self::Parse
    }
}

impl ValidationStrategy {
    /// Returns true for strategies that can only run on the asynchronous path.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Self::ParseAsync | Self::SafeParseAsync)
    }

    /// Returns the canonical name of the strategy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::SafeParse => "safeParse",
            Self::ParseAsync => "parseAsync",
            Self::SafeParseAsync => "safeParseAsync",
        }
    }
}

impl fmt::Display for ValidationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure policy inside a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Stop at the first failing check.
    FailFast,
    /// Run every check and report all failures.
    CollectAll,
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::FailFast
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::CollectAll => write!(f, "collect-all"),
        }
    }
}

/// The phase of a call being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    /// Arguments, checked before the method runs.
    Input,
    /// Return value, checked after the method resolves.
    Output,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Whether a wrapped method is declared asynchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MethodKind {
    /// Returns its value directly (it may still hand back a pending value).
    #[default]
    Sync,
    /// Always suspends; forces the asynchronous dispatch path.
    Async,
}
