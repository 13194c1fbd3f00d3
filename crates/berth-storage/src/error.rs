// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type for the storage layer.
//!
//! Only machinery failures are errors here. Domain outcomes that callers act
//! on (name collisions, ordering violations, release rule failures) are
//! returned as values from the query modules so they survive the trip out of
//! the connection closures unchanged.

use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database machinery errors (SQL failures, conversion failures,
    /// constraint violations, closed connection).
    #[error("database error: {source}")]
    Database {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Migration failures on open.
    #[error("migration error: {0}")]
    Migration(String),
}

impl From<StoreError> for berth_core::BerthError {
    fn from(e: StoreError) -> Self {
        berth_core::BerthError::Storage {
            source: Box::new(e),
        }
    }
}
