// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Berth plugin registry.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for the
//! plugin catalog, the append-only version history, and dependency edges.

pub mod database;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
