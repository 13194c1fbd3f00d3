// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background
//! thread, which is what makes the check-then-insert transactions in the
//! query modules race-free. Do NOT create additional Connection instances
//! for the same file.

use tokio_rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;

/// Handle to the registry database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies the
    /// connection PRAGMAs, and runs pending migrations.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).await.map_err(|e| StoreError::Database {
            source: Box::new(e),
        })?;
        Self::prepare(conn).await
    }

    /// Opens a fresh in-memory database with the full schema applied.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Database {
                source: Box::new(e),
            })?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(crate::migrations::run_migrations)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        debug!("registry database ready");
        Ok(Self { conn })
    }

    /// Returns the underlying connection for use by the query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL ahead of shutdown.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Converts tokio-rusqlite errors into [`StoreError`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StoreError {
    StoreError::Database {
        source: Box::new(e),
    }
}
