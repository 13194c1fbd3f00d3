// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version history operations.
//!
//! The multi-step invariants live here: a version insert re-checks semver
//! ordering against a fresh read inside the same transaction that writes the
//! row and its dependency edges, and a release re-checks the newest-only and
//! state rules inside the transaction that flips the state. Outcomes are
//! returned as values; [`StoreError`] is reserved for machinery failures.

use berth_core::VersionState;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::error::StoreError;
use crate::models::{
    column_error, map_plugin_row, map_version_row, DependencyEdge, NewVersion, Plugin,
    PluginVersion, PLUGIN_COLUMNS, VERSION_COLUMNS,
};
use crate::queries::dependencies;

/// Outcome of attempting to insert a new version row.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted {
        plugin: Plugin,
        version: PluginVersion,
    },
    /// The plugin row is gone.
    PluginMissing,
    /// The exact version string already exists, in any state.
    Duplicate { existing: String },
    /// The new version is not strictly greater than the latest non-cancelled
    /// row.
    NotMonotonic { latest: String },
}

/// Outcome of attempting to release a version.
#[derive(Debug)]
pub enum ReleaseOutcome {
    Released {
        plugin: Plugin,
        version: PluginVersion,
    },
    Missing,
    /// A non-cancelled semver-greater sibling exists; only the newest version
    /// may be released.
    NotNewest { newest: String },
    /// The version is not in the unreleased state.
    WrongState { state: VersionState },
}

/// Inserts a version row and its dependency edges in one transaction.
///
/// The ordering rule is enforced against a read taken inside this
/// transaction: the new version must be strictly greater than every
/// non-cancelled sibling, and must not equal any sibling in any state. The
/// `UNIQUE (plugin_id, version)` constraint backstops the duplicate check.
pub async fn insert_with_dependencies(
    db: &Database,
    new: NewVersion,
    edges: Vec<DependencyEdge>,
) -> Result<InsertOutcome, StoreError> {
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let plugin = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
                stmt.query_row(params![new.plugin_id], map_plugin_row)
                    .optional()?
            };
            let Some(plugin) = plugin else {
                return Ok(InsertOutcome::PluginMissing);
            };

            let new_text = new.version.to_string();
            {
                let mut stmt = tx.prepare(
                    "SELECT version, state FROM plugin_versions WHERE plugin_id = ?1",
                )?;
                let rows = stmt.query_map(params![new.plugin_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut latest: Option<(semver::Version, String)> = None;
                for row in rows {
                    let (text, state) = row?;
                    if text == new_text {
                        return Ok(InsertOutcome::Duplicate { existing: text });
                    }
                    if state == "cancelled" {
                        continue;
                    }
                    let parsed = semver::Version::parse(&text)
                        .map_err(|e| column_error(0, e.to_string()))?;
                    let replace = match &latest {
                        Some((current, _)) => parsed > *current,
                        None => true,
                    };
                    if replace {
                        latest = Some((parsed, text));
                    }
                }
                if let Some((latest_version, latest_text)) = latest {
                    if new.version <= latest_version {
                        return Ok(InsertOutcome::NotMonotonic {
                            latest: latest_text,
                        });
                    }
                }
            }

            tx.execute(
                "INSERT INTO plugin_versions
                 (plugin_id, version, is_backwards_compatible, previous_release_version,
                  manifest_json, icon_light, icon_dark, icon_selected_light,
                  icon_selected_dark, entry_document_ref, entry_script_ref, upload_hash,
                  created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    new.plugin_id,
                    new_text,
                    new.is_backwards_compatible,
                    new.previous_release_version,
                    new.manifest_json,
                    new.icon_light,
                    new.icon_dark,
                    new.icon_selected_light,
                    new.icon_selected_dark,
                    new.entry_document_ref,
                    new.entry_script_ref,
                    new.upload_hash,
                    now,
                ],
            )?;
            let version_id = tx.last_insert_rowid();
            let version = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE id = ?1"
                ))?;
                stmt.query_row(params![version_id], map_version_row)?
            };

            dependencies::insert_edges(&tx, &plugin, &version, &edges, &now)?;

            tx.commit()?;
            Ok(InsertOutcome::Inserted { plugin, version })
        })
        .await
        .map_err(map_tr_err)
}

/// Get a version row together with its plugin.
pub async fn get_with_plugin(
    db: &Database,
    version_id: i64,
) -> Result<Option<(Plugin, PluginVersion)>, StoreError> {
    db.connection()
        .call(move |conn| {
            let version = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE id = ?1"
                ))?;
                stmt.query_row(params![version_id], map_version_row)
                    .optional()?
            };
            let Some(version) = version else {
                return Ok(None);
            };
            let plugin = {
                let mut stmt =
                    conn.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
                stmt.query_row(params![version.plugin_id], map_plugin_row)
                    .optional()?
            };
            Ok(plugin.map(|plugin| (plugin, version)))
        })
        .await
        .map_err(map_tr_err)
}

/// List all version rows of a plugin in insertion order.
pub async fn list_for_plugin(
    db: &Database,
    plugin_id: i64,
) -> Result<Vec<PluginVersion>, StoreError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE plugin_id = ?1 ORDER BY id"
            ))?;
            let versions = stmt
                .query_map(params![plugin_id], map_version_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(versions)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a released version of the plugin holding `name_key`.
///
/// This is the dependency resolution read: only released versions can be
/// depended upon, so unreleased and cancelled rows are invisible here.
pub async fn released_by_name_key(
    db: &Database,
    name_key: &str,
    version: &str,
) -> Result<Option<(Plugin, PluginVersion)>, StoreError> {
    let name_key = name_key.to_string();
    let version = version.to_string();
    db.connection()
        .call(move |conn| {
            let plugin = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PLUGIN_COLUMNS} FROM plugins WHERE name_key = ?1"
                ))?;
                stmt.query_row(params![name_key], map_plugin_row).optional()?
            };
            let Some(plugin) = plugin else {
                return Ok(None);
            };
            let found = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM plugin_versions
                     WHERE plugin_id = ?1 AND version = ?2 AND state = 'released'"
                ))?;
                stmt.query_row(params![plugin.id, version], map_version_row)
                    .optional()?
            };
            Ok(found.map(|version| (plugin, version)))
        })
        .await
        .map_err(map_tr_err)
}

/// Releases a version inside one transaction: newest-only and state rules are
/// re-checked against fresh reads, the state flips to released, and the
/// plugin's back-pointer for its visibility is moved.
pub async fn release(db: &Database, version_id: i64) -> Result<ReleaseOutcome, StoreError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let version = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE id = ?1"
                ))?;
                stmt.query_row(params![version_id], map_version_row)
                    .optional()?
            };
            let Some(version) = version else {
                return Ok(ReleaseOutcome::Missing);
            };
            let plugin = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
                stmt.query_row(params![version.plugin_id], map_plugin_row)
                    .optional()?
            };
            let Some(plugin) = plugin else {
                return Ok(ReleaseOutcome::Missing);
            };

            let this = semver::Version::parse(&version.version)
                .map_err(|e| column_error(2, e.to_string()))?;
            {
                let mut stmt = tx.prepare(
                    "SELECT version FROM plugin_versions
                     WHERE plugin_id = ?1 AND state != 'cancelled' AND id != ?2",
                )?;
                let rows = stmt.query_map(params![plugin.id, version.id], |row| {
                    row.get::<_, String>(0)
                })?;
                let mut newest: Option<(semver::Version, String)> = None;
                for row in rows {
                    let text = row?;
                    let sibling = semver::Version::parse(&text)
                        .map_err(|e| column_error(0, e.to_string()))?;
                    let replace = match &newest {
                        Some((current, _)) => sibling > *current,
                        None => sibling > this,
                    };
                    if replace {
                        newest = Some((sibling, text));
                    }
                }
                if let Some((_, newest_text)) = newest {
                    return Ok(ReleaseOutcome::NotNewest {
                        newest: newest_text,
                    });
                }
            }

            if version.state != VersionState::Unreleased {
                return Ok(ReleaseOutcome::WrongState {
                    state: version.state,
                });
            }

            tx.execute(
                "UPDATE plugin_versions SET state = 'released' WHERE id = ?1",
                params![version.id],
            )?;
            let pointer = if plugin.is_private {
                "last_released_private_version_id"
            } else {
                "last_released_public_version_id"
            };
            tx.execute(
                &format!("UPDATE plugins SET {pointer} = ?1 WHERE id = ?2"),
                params![version.id, plugin.id],
            )?;

            let version = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE id = ?1"
                ))?;
                stmt.query_row(params![version.id], map_version_row)?
            };
            let plugin = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
                stmt.query_row(params![plugin.id], map_plugin_row)?
            };

            tx.commit()?;
            Ok(ReleaseOutcome::Released { plugin, version })
        })
        .await
        .map_err(map_tr_err)
}

/// Moderation hook: takes a version permanently out of circulation.
///
/// Cancelled versions stop counting for ordering checks, cannot be released,
/// and are invisible to dependents. Returns the updated row, or `None` if no
/// such version exists.
pub async fn cancel(db: &Database, version_id: i64) -> Result<Option<PluginVersion>, StoreError> {
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                "UPDATE plugin_versions SET state = 'cancelled' WHERE id = ?1",
                params![version_id],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            let mut stmt = conn.prepare(&format!(
                "SELECT {VERSION_COLUMNS} FROM plugin_versions WHERE id = ?1"
            ))?;
            let version = stmt.query_row(params![version_id], map_version_row)?;
            Ok(Some(version))
        })
        .await
        .map_err(map_tr_err)
}
