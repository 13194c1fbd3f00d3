// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin name rules and key derivation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RegistryError;

/// Allowed shape: alphanumeric start, then up to 63 more characters drawn
/// from alphanumerics, spaces, underscores, and hyphens.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]{0,63}$").expect("static pattern"));

/// Name keys nobody may claim.
const RESERVED_KEYS: &[&str] = &[
    "berth", "plugin", "plugins", "registry", "official", "admin", "api", "new",
];

/// Derives the uniqueness key of a plugin name.
pub fn derive_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validates a plugin name and returns its derived key.
pub fn validate_name(name: &str) -> Result<String, RegistryError> {
    if !NAME_PATTERN.is_match(name) {
        return Err(RegistryError::InvalidParams(format!(
            "plugin name `{name}` must start with a letter or digit and use only \
             letters, digits, spaces, `_`, or `-` (max 64 characters)"
        )));
    }
    let key = derive_name_key(name);
    if RESERVED_KEYS.contains(&key.as_str()) {
        return Err(RegistryError::InvalidParams(format!(
            "plugin name `{name}` is reserved"
        )));
    }
    Ok(key)
}
