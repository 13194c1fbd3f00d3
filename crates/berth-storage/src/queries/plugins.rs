// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin catalog operations.

use berth_core::types::{OrgId, PluginOwner, UserId};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::error::StoreError;
use crate::models::{map_plugin_row, NewPlugin, Plugin, PLUGIN_COLUMNS};

/// Outcome of attempting to register a plugin name.
#[derive(Debug)]
pub enum RegisterOutcome {
    Created(Plugin),
    /// Another plugin already holds this name key.
    NameTaken,
}

/// Registers a plugin inside one transaction: the name key is checked unused
/// and the row inserted before anything else can claim it. The UNIQUE
/// constraint on `name_key` backstops the check.
pub async fn register(db: &Database, new: NewPlugin) -> Result<RegisterOutcome, StoreError> {
    let now = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let taken = {
                let mut stmt = tx.prepare("SELECT id FROM plugins WHERE name_key = ?1")?;
                stmt.exists(params![new.name_key])?
            };
            if taken {
                return Ok(RegisterOutcome::NameTaken);
            }
            let (owner_kind, owner_user_id, owner_org_id) = owner_columns(&new.owner);
            tx.execute(
                "INSERT INTO plugins
                 (name, name_key, owner_kind, owner_user_id, owner_org_id, is_private, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.name,
                    new.name_key,
                    owner_kind,
                    owner_user_id,
                    owner_org_id,
                    new.is_private,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let plugin = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
                stmt.query_row(params![id], map_plugin_row)?
            };
            tx.commit()?;
            Ok(RegisterOutcome::Created(plugin))
        })
        .await
        .map_err(map_tr_err)
}

/// Get a plugin by ID.
pub async fn get(db: &Database, id: i64) -> Result<Option<Plugin>, StoreError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = ?1"))?;
            let plugin = stmt.query_row(params![id], map_plugin_row).optional()?;
            Ok(plugin)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a plugin by its derived name key.
pub async fn get_by_name_key(
    db: &Database,
    name_key: &str,
) -> Result<Option<Plugin>, StoreError> {
    let name_key = name_key.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PLUGIN_COLUMNS} FROM plugins WHERE name_key = ?1"
            ))?;
            let plugin = stmt
                .query_row(params![name_key], map_plugin_row)
                .optional()?;
            Ok(plugin)
        })
        .await
        .map_err(map_tr_err)
}

fn owner_columns(owner: &PluginOwner) -> (&'static str, Option<i64>, Option<i64>) {
    match owner {
        PluginOwner::User(UserId(id)) => ("user", Some(*id), None),
        PluginOwner::Org(OrgId(id)) => ("org", None, Some(*id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn make_plugin(name: &str) -> NewPlugin {
        NewPlugin {
            name: name.to_string(),
            name_key: name.trim().to_lowercase(),
            owner: PluginOwner::User(UserId(1)),
            is_private: false,
        }
    }

    #[tokio::test]
    async fn register_and_get_roundtrips() {
        let db = setup_db().await;

        let outcome = register(&db, make_plugin("Chart Tools")).await.unwrap();
        let RegisterOutcome::Created(plugin) = outcome else {
            panic!("expected Created");
        };
        assert_eq!(plugin.name, "Chart Tools");
        assert_eq!(plugin.name_key, "chart tools");
        assert_eq!(plugin.owner, PluginOwner::User(UserId(1)));
        assert!(!plugin.is_private);
        assert_eq!(plugin.last_released_public_version_id, None);

        let fetched = get(&db, plugin.id).await.unwrap().unwrap();
        assert_eq!(fetched, plugin);
    }

    #[tokio::test]
    async fn register_same_key_is_taken() {
        let db = setup_db().await;

        register(&db, make_plugin("tools")).await.unwrap();
        let outcome = register(&db, make_plugin("Tools")).await.unwrap();
        assert!(matches!(outcome, RegisterOutcome::NameTaken));
    }

    #[tokio::test]
    async fn org_owner_roundtrips() {
        let db = setup_db().await;

        let new = NewPlugin {
            name: "internal".to_string(),
            name_key: "internal".to_string(),
            owner: PluginOwner::Org(OrgId(42)),
            is_private: true,
        };
        let RegisterOutcome::Created(plugin) = register(&db, new).await.unwrap() else {
            panic!("expected Created");
        };
        assert_eq!(plugin.owner, PluginOwner::Org(OrgId(42)));
        assert!(plugin.is_private);

        let fetched = get_by_name_key(&db, "internal").await.unwrap().unwrap();
        assert_eq!(fetched.id, plugin.id);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let db = setup_db().await;
        assert!(get(&db, 999).await.unwrap().is_none());
        assert!(get_by_name_key(&db, "ghost").await.unwrap().is_none());
    }
}
