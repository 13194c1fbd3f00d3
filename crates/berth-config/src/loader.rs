// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./berth.toml` > `~/.config/berth/berth.toml`
//! > `/etc/berth/berth.toml`, with environment variable overrides via the
//! `BERTH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BerthConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/berth/berth.toml` (system-wide)
/// 3. `~/.config/berth/berth.toml` (user XDG config)
/// 4. `./berth.toml` (local directory)
/// 5. `BERTH_*` environment variables
pub fn load_config() -> Result<BerthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BerthConfig::default()))
        .merge(Toml::file("/etc/berth/berth.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("berth/berth.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("berth.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<BerthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BerthConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BerthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BerthConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BERTH_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("BERTH_").map(|key| {
        // The key arrives in the variable's original case.
        let lowered = key.as_str().to_ascii_lowercase();
        let mapped = lowered
            .replacen("registry_", "registry.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("blobs_", "blobs.", 1);
        mapped.into()
    })
}
