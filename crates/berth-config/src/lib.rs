// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Berth registry: layered TOML loading with `BERTH_*`
//! environment overrides, plus post-deserialization validation.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BerthConfig;

use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration failures surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A deserialized value fails a semantic rule.
    #[error("invalid configuration: {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Validates semantic rules the deserializer cannot express.
pub fn validate_config(config: &BerthConfig) -> Result<(), ConfigError> {
    if !LOG_LEVELS.contains(&config.registry.log_level.as_str()) {
        return Err(ConfigError::Invalid {
            field: "registry.log_level",
            message: format!(
                "`{}` is not one of {}",
                config.registry.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if config.storage.database_path.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "storage.database_path",
            message: "must not be empty".to_string(),
        });
    }
    if config.blobs.root.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "blobs.root",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Loads the standard hierarchy and validates the result.
pub fn load_and_validate() -> Result<BerthConfig, ConfigError> {
    let config = load_config().map_err(Box::new)?;
    validate_config(&config)?;
    Ok(config)
}
