// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Berth registry.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so unrecognized keys fail
//! at startup with an actionable message instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Berth configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BerthConfig {
    /// Registry service settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Database backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Blob store settings.
    #[serde(default)]
    pub blobs: BlobConfig,
}

/// Registry service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Database backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "berth.db".to_string()
}

/// Blob store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlobConfig {
    /// Root directory of the local blob store.
    #[serde(default = "default_blob_root")]
    pub root: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            root: default_blob_root(),
        }
    }
}

fn default_blob_root() -> String {
    "blobs".to_string()
}
