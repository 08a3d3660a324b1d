//! Core vocabulary shared by every schemagate module.
//!
//! This module contains:
//! - Validation strategies, modes and phase kinds
//! - Method synchrony flags

mod strategy;

pub use strategy::{MethodKind, ValidationKind, ValidationMode, ValidationStrategy};
