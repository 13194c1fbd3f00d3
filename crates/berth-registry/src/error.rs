// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed outcome set of the version registry.
//!
//! Every failed registry operation maps to exactly one of these variants;
//! `Display` is the user-facing message. `Unknown` wraps unexpected machinery
//! failures and always means the transaction, if any, was rolled back.

use thiserror::Error;

/// Why a registry operation was refused.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Another plugin already holds the requested name.
    #[error("a plugin with this name already exists")]
    NameTaken,

    /// A parameter fails its validation rule.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The manifest engine rejected the manifest document.
    #[error("the plugin manifest is invalid: {0}")]
    ManifestInvalid(String),

    /// A declared dependency crosses a private ownership boundary.
    #[error("dependency not permitted: {0}")]
    DependencyPermission(String),

    /// A declared dependency cannot be resolved to a released version.
    #[error("a manifest dependency is missing: {0}")]
    ManifestDependencyMissing(String),

    /// The new version is not a compatible successor of the released one.
    #[error("the new version is not compatible with the released version")]
    IncompatibleUpdate,

    /// The new version violates the monotonic ordering rule.
    #[error("bad version: {0}")]
    BadVersion(String),

    /// The caller does not own the plugin, or the version is not eligible.
    #[error("this action is not permitted")]
    ForbiddenAction,

    /// The version is not in a state that allows the operation.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The plugin or version does not exist.
    #[error("not found")]
    NotFound,

    /// Unexpected failure; any open transaction was rolled back.
    #[error("unexpected registry error: {0}")]
    Unknown(String),
}

impl From<berth_storage::StoreError> for RegistryError {
    fn from(e: berth_storage::StoreError) -> Self {
        Self::Unknown(e.to_string())
    }
}
