//! Observability utilities.
//!
//! The crate emits `tracing` events at its decision points (registration,
//! path selection, bypass, phase failures, hook replacement). This module
//! installs a subscriber for applications that do not bring their own.

mod logging;

pub use logging::{build_filter, init_logging, LogFormat, DEFAULT_DIRECTIVE};
