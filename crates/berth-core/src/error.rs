// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Berth registry crates.

use thiserror::Error;

/// The infrastructure error type used across Berth capability traits and
/// core operations.
///
/// Domain outcomes (rejected manifests, version-ordering violations, release
/// rule failures) have their own closed types in the crates that own them;
/// `BerthError` covers the machinery underneath.
#[derive(Debug, Error)]
pub enum BerthError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Blob store errors (object write failure, layout creation).
    #[error("blob store error: {message}")]
    BlobStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Manifest engine errors (validation call failure, unresolvable upstream set).
    #[error("manifest engine error: {message}")]
    Engine {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
