//! Process-wide validation configuration.
//!
//! The live record sits behind an [`ArcSwap`]; every update replaces the whole
//! record so a call never observes half-applied defaults.

use crate::core::{ValidationMode, ValidationStrategy};
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Environment variable consulted for the effective `enabled` flag.
pub const DEFAULT_ENV_VAR: &str = "SCHEMAGATE_ENABLED";

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];
const FALSY: [&str; 4] = ["0", "false", "no", "off"];

/// Interprets an environment flag, case-insensitively.
///
/// Returns `None` for empty or unrecognized values.
#[must_use]
pub fn parse_env_flag(raw: &str) -> Option<bool> {
    let normalized = raw.to_lowercase();
    if TRUTHY.contains(&normalized.as_str()) {
        Some(true)
    } else if FALSY.contains(&normalized.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Validation settings shared by every dispatcher reading the same store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Stored master switch.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Name of the environment variable that overrides `enabled`.
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// Input strategy used when a method sets none.
    #[serde(default)]
    pub default_input_strategy: ValidationStrategy,
    /// Output strategy used when a method sets none.
    #[serde(default)]
    pub default_output_strategy: ValidationStrategy,
    /// Failure mode used when a method sets none.
    #[serde(default)]
    pub default_mode: ValidationMode,
}

fn default_enabled() -> bool {
    true
}

fn default_env_var() -> String {
    DEFAULT_ENV_VAR.to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            env_var: default_env_var(),
            default_input_strategy: ValidationStrategy::Parse,
            default_output_strategy: ValidationStrategy::Parse,
            default_mode: ValidationMode::FailFast,
        }
    }
}

impl ValidationConfig {
    /// Returns a copy with every field set in `patch` applied.
    #[must_use]
    pub fn merged(mut self, patch: ValidationConfigPatch) -> Self {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(env_var) = patch.env_var {
            self.env_var = env_var;
        }
        if let Some(strategy) = patch.default_input_strategy {
            self.default_input_strategy = strategy;
        }
        if let Some(strategy) = patch.default_output_strategy {
            self.default_output_strategy = strategy;
        }
        if let Some(mode) = patch.default_mode {
            self.default_mode = mode;
        }
        self
    }

    /// The effective master switch.
    ///
    /// A recognized value in the environment variable wins; otherwise the
    /// stored flag applies.
    #[must_use]
    pub fn effective_enabled(&self) -> bool {
        std::env::var(&self.env_var)
            .ok()
            .and_then(|raw| parse_env_flag(&raw))
            .unwrap_or(self.enabled)
    }
}

/// Partial update for [`ValidationConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfigPatch {
    /// New stored master switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// New environment variable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,
    /// New default input strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_input_strategy: Option<ValidationStrategy>,
    /// New default output strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_output_strategy: Option<ValidationStrategy>,
    /// New default mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<ValidationMode>,
}

/// Holder of the live configuration record.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ValidationConfig>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Creates a store holding the factory defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Creates a store holding the given record.
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Returns a snapshot copy of the current record.
    #[must_use]
    pub fn get(&self) -> ValidationConfig {
        self.current.load().as_ref().clone()
    }

    /// Merges a partial update and returns the resulting record.
    pub fn set(&self, patch: ValidationConfigPatch) -> ValidationConfig {
        let previous = self
            .current
            .rcu(|current| Arc::new(current.as_ref().clone().merged(patch.clone())));
        let updated = previous.as_ref().clone().merged(patch);
        debug!(
            enabled = updated.enabled,
            env_var = %updated.env_var,
            input = %updated.default_input_strategy,
            output = %updated.default_output_strategy,
            mode = %updated.default_mode,
            "Validation config updated"
        );
        updated
    }

    /// Restores the factory defaults and returns them.
    pub fn reset(&self) -> ValidationConfig {
        let defaults = ValidationConfig::default();
        self.current.store(Arc::new(defaults.clone()));
        debug!("Validation config reset to defaults");
        defaults
    }

    /// Returns the effective master switch, consulting the environment.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.current.load().effective_enabled()
    }
}

/// Global configuration store.
pub static CONFIG: LazyLock<Arc<ConfigStore>> = LazyLock::new(|| Arc::new(ConfigStore::new()));

/// Returns a snapshot of the global configuration.
#[must_use]
pub fn get_validation_config() -> ValidationConfig {
    CONFIG.get()
}

/// Merges a partial update into the global configuration.
pub fn set_validation_config(patch: ValidationConfigPatch) -> ValidationConfig {
    CONFIG.set(patch)
}

/// Restores the global configuration to factory defaults.
pub fn reset_validation_config() -> ValidationConfig {
    CONFIG.reset()
}

/// Returns the effective global master switch.
#[must_use]
pub fn is_validation_enabled() -> bool {
    CONFIG.is_enabled()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_env(env_var: &str) -> ConfigStore {
        ConfigStore::with_config(ValidationConfig {
            env_var: env_var.to_string(),
            ..ValidationConfig::default()
        })
    }

    #[test]
    fn test_parse_env_flag() {
        for raw in ["1", "true", "TRUE", "Yes", "on"] {
            assert_eq!(parse_env_flag(raw), Some(true), "{raw}");
        }
        for raw in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_env_flag(raw), Some(false), "{raw}");
        }
        for raw in ["", "maybe", "2", " true"] {
            assert_eq!(parse_env_flag(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_defaults() {
        let config = ValidationConfig::default();
        assert!(config.enabled);
        assert_eq!(config.env_var, DEFAULT_ENV_VAR);
        assert_eq!(config.default_input_strategy, ValidationStrategy::Parse);
        assert_eq!(config.default_output_strategy, ValidationStrategy::Parse);
        assert_eq!(config.default_mode, ValidationMode::FailFast);
    }

    #[test]
    fn test_set_merges_and_get_returns_copy() {
        let store = store_with_env("SCHEMAGATE_TEST_CONFIG_MERGE");
        let updated = store.set(ValidationConfigPatch {
            default_mode: Some(ValidationMode::CollectAll),
            ..Default::default()
        });
        assert_eq!(updated.default_mode, ValidationMode::CollectAll);
        assert_eq!(updated.env_var, "SCHEMAGATE_TEST_CONFIG_MERGE");

        let mut snapshot = store.get();
        snapshot.enabled = false;
        assert!(store.get().enabled);
        assert_eq!(store.get(), updated);
    }

    #[test]
    fn test_reset_restores_factory_defaults() {
        let store = ConfigStore::new();
        store.set(ValidationConfigPatch {
            enabled: Some(false),
            env_var: Some("OTHER".to_string()),
            default_output_strategy: Some(ValidationStrategy::SafeParseAsync),
            ..Default::default()
        });
        let reset = store.reset();
        assert_eq!(reset, ValidationConfig::default());
        assert_eq!(store.get(), ValidationConfig::default());
    }

    #[test]
    fn test_stored_flag_used_without_env() {
        let store = store_with_env("SCHEMAGATE_TEST_CONFIG_ABSENT");
        assert!(store.is_enabled());
        store.set(ValidationConfigPatch {
            enabled: Some(false),
            ..Default::default()
        });
        assert!(!store.is_enabled());
    }

    #[test]
    fn test_env_overrides_stored_flag() {
        let store = store_with_env("SCHEMAGATE_TEST_CONFIG_OVERRIDE");

        std::env::set_var("SCHEMAGATE_TEST_CONFIG_OVERRIDE", "Off");
        assert!(!store.is_enabled());

        store.set(ValidationConfigPatch {
            enabled: Some(false),
            ..Default::default()
        });
        std::env::set_var("SCHEMAGATE_TEST_CONFIG_OVERRIDE", "YES");
        assert!(store.is_enabled());

        // Unrecognized values fall back to the stored flag.
        std::env::set_var("SCHEMAGATE_TEST_CONFIG_OVERRIDE", "sometimes");
        assert!(!store.is_enabled());

        std::env::remove_var("SCHEMAGATE_TEST_CONFIG_OVERRIDE");
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ValidationConfig =
            serde_json::from_str(r#"{"default_mode": "collect-all"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.env_var, DEFAULT_ENV_VAR);
        assert_eq!(config.default_mode, ValidationMode::CollectAll);
    }
}
