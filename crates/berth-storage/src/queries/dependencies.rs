// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency edge operations.
//!
//! Edges are only ever written inside the transaction that inserts their
//! owning version, so the write path takes a [`rusqlite::Transaction`]
//! rather than the database handle.

use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::error::StoreError;
use crate::models::{
    map_dependency_row, DependencyEdge, Plugin, PluginVersion, VersionDependency,
    DEPENDENCY_COLUMNS,
};

/// Writes the coalesced edges for a freshly inserted version. The dependent
/// side is denormalized from the owning plugin and version rows.
pub(crate) fn insert_edges(
    tx: &rusqlite::Transaction<'_>,
    plugin: &Plugin,
    version: &PluginVersion,
    edges: &[DependencyEdge],
    now: &str,
) -> Result<(), rusqlite::Error> {
    let mut stmt = tx.prepare(
        "INSERT INTO plugin_version_dependencies
         (plugin_version_id, depends_on_version_id, dependent_name, dependent_name_key,
          dependent_version, dependency_name, dependency_name_key, dependency_version,
          is_primary, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )?;
    for edge in edges {
        stmt.execute(params![
            version.id,
            edge.depends_on_version_id,
            plugin.name,
            plugin.name_key,
            version.version,
            edge.dependency_name,
            edge.dependency_name_key,
            edge.dependency_version,
            edge.is_primary,
            now,
        ])?;
    }
    Ok(())
}

/// List the dependency edges of a version, primary edges first.
pub async fn list_for_version(
    db: &Database,
    version_id: i64,
) -> Result<Vec<VersionDependency>, StoreError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {DEPENDENCY_COLUMNS} FROM plugin_version_dependencies
                 WHERE plugin_version_id = ?1
                 ORDER BY is_primary DESC, dependency_name"
            ))?;
            let edges = stmt
                .query_map(params![version_id], map_dependency_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(edges)
        })
        .await
        .map_err(map_tr_err)
}
