//! Engine configuration.
//!
//! Loaded from TOML at collection/schema setup. Applying a config only
//! affects the current thread; the engine is single-threaded per collection.

use crate::{MAX_KEY_COMPONENTS, MAX_KEY_COMPONENTS_LIMIT, obs};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_key_components must be between 1 and {max}, found {found}")]
    KeyComponents { found: usize, max: usize },
}

///
/// EngineConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of key components one index may declare.
    pub max_key_components: usize,

    /// Whether index and relation events are recorded in metrics.
    pub metrics: bool,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_key_components == 0 || self.max_key_components > MAX_KEY_COMPONENTS_LIMIT {
            return Err(ConfigError::KeyComponents {
                found: self.max_key_components,
                max: MAX_KEY_COMPONENTS_LIMIT,
            });
        }

        Ok(())
    }

    /// Install thread-local switches derived from this config.
    pub fn apply(&self) {
        obs::set_metrics_enabled(self.metrics);
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_key_components: MAX_KEY_COMPONENTS,
            metrics: true,
        }
    }
}
