// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the registry tables and their rusqlite mappers.

use berth_core::types::{OrgId, PluginOwner, UserId, Visibility};
use berth_core::VersionState;

/// A registered plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    pub id: i64,
    pub name: String,
    /// Trimmed, lowercased uniqueness key derived from `name`.
    pub name_key: String,
    pub owner: PluginOwner,
    pub is_private: bool,
    pub last_released_public_version_id: Option<i64>,
    pub last_released_private_version_id: Option<i64>,
    pub created_at: String,
}

impl Plugin {
    pub fn visibility(&self) -> Visibility {
        if self.is_private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    /// The back-pointer to the most recently released version, for this
    /// plugin's visibility.
    pub fn last_released_version_id(&self) -> Option<i64> {
        if self.is_private {
            self.last_released_private_version_id
        } else {
            self.last_released_public_version_id
        }
    }
}

/// Input for registering a plugin.
#[derive(Debug, Clone)]
pub struct NewPlugin {
    pub name: String,
    pub name_key: String,
    pub owner: PluginOwner,
    pub is_private: bool,
}

/// One stored version of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginVersion {
    pub id: i64,
    pub plugin_id: i64,
    pub version: String,
    pub state: VersionState,
    pub is_backwards_compatible: Option<bool>,
    pub previous_release_version: Option<String>,
    pub manifest_json: String,
    pub icon_light: String,
    pub icon_dark: String,
    pub icon_selected_light: String,
    pub icon_selected_dark: String,
    pub entry_document_ref: String,
    pub entry_script_ref: String,
    pub upload_hash: String,
    pub created_at: String,
}

/// Input for inserting a version row.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub plugin_id: i64,
    pub version: semver::Version,
    pub is_backwards_compatible: Option<bool>,
    pub previous_release_version: Option<String>,
    pub manifest_json: String,
    pub icon_light: String,
    pub icon_dark: String,
    pub icon_selected_light: String,
    pub icon_selected_dark: String,
    pub entry_document_ref: String,
    pub entry_script_ref: String,
    pub upload_hash: String,
}

/// Input for one coalesced dependency edge. The dependent side is filled in
/// from the owning version at insert time.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub depends_on_version_id: i64,
    pub dependency_name: String,
    pub dependency_name_key: String,
    pub dependency_version: String,
    /// Declared directly in the manifest, as opposed to pulled in
    /// transitively.
    pub is_primary: bool,
}

/// A stored dependency edge.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDependency {
    pub id: i64,
    pub plugin_version_id: i64,
    pub depends_on_version_id: i64,
    pub dependent_name: String,
    pub dependent_name_key: String,
    pub dependent_version: String,
    pub dependency_name: String,
    pub dependency_name_key: String,
    pub dependency_version: String,
    pub is_primary: bool,
    pub created_at: String,
}

// --- Column lists and row mappers ---

pub(crate) const PLUGIN_COLUMNS: &str = "id, name, name_key, owner_kind, owner_user_id, \
     owner_org_id, is_private, last_released_public_version_id, \
     last_released_private_version_id, created_at";

pub(crate) const VERSION_COLUMNS: &str = "id, plugin_id, version, state, \
     is_backwards_compatible, previous_release_version, manifest_json, icon_light, \
     icon_dark, icon_selected_light, icon_selected_dark, entry_document_ref, \
     entry_script_ref, upload_hash, created_at";

pub(crate) const DEPENDENCY_COLUMNS: &str = "id, plugin_version_id, depends_on_version_id, \
     dependent_name, dependent_name_key, dependent_version, dependency_name, \
     dependency_name_key, dependency_version, is_primary, created_at";

/// Builds a column conversion error for data that should never be in the
/// database.
pub(crate) fn column_error(index: usize, message: impl Into<String>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        message.into().into(),
    )
}

pub(crate) fn map_plugin_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Plugin> {
    let owner_kind: String = row.get(3)?;
    let owner_user_id: Option<i64> = row.get(4)?;
    let owner_org_id: Option<i64> = row.get(5)?;
    let owner = match owner_kind.as_str() {
        "user" => PluginOwner::User(UserId(
            owner_user_id.ok_or_else(|| column_error(4, "owner_user_id is null"))?,
        )),
        "org" => PluginOwner::Org(OrgId(
            owner_org_id.ok_or_else(|| column_error(5, "owner_org_id is null"))?,
        )),
        other => return Err(column_error(3, format!("unknown owner_kind `{other}`"))),
    };
    Ok(Plugin {
        id: row.get(0)?,
        name: row.get(1)?,
        name_key: row.get(2)?,
        owner,
        is_private: row.get(6)?,
        last_released_public_version_id: row.get(7)?,
        last_released_private_version_id: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub(crate) fn map_version_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PluginVersion> {
    let state_text: String = row.get(3)?;
    let state = state_text
        .parse::<VersionState>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(e),
        ))?;
    Ok(PluginVersion {
        id: row.get(0)?,
        plugin_id: row.get(1)?,
        version: row.get(2)?,
        state,
        is_backwards_compatible: row.get(4)?,
        previous_release_version: row.get(5)?,
        manifest_json: row.get(6)?,
        icon_light: row.get(7)?,
        icon_dark: row.get(8)?,
        icon_selected_light: row.get(9)?,
        icon_selected_dark: row.get(10)?,
        entry_document_ref: row.get(11)?,
        entry_script_ref: row.get(12)?,
        upload_hash: row.get(13)?,
        created_at: row.get(14)?,
    })
}

pub(crate) fn map_dependency_row(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<VersionDependency> {
    Ok(VersionDependency {
        id: row.get(0)?,
        plugin_version_id: row.get(1)?,
        depends_on_version_id: row.get(2)?,
        dependent_name: row.get(3)?,
        dependent_name_key: row.get(4)?,
        dependent_version: row.get(5)?,
        dependency_name: row.get(6)?,
        dependency_name_key: row.get(7)?,
        dependency_version: row.get(8)?,
        is_primary: row.get(9)?,
        created_at: row.get(10)?,
    })
}
