// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry service tests over a real in-memory database, driving the whole
//! ingestion pipeline with fixture archives and scripting the external
//! engine and blob store.

use std::sync::Arc;

use berth_core::types::{OrgId, UserId, Visibility};
use berth_core::{Compatibility, PluginOwner, VersionState};
use berth_ingest::{ArchiveIngestor, PackageDescriptor};
use berth_registry::{RegistryError, VersionRegistry};
use berth_storage::queries::dependencies;
use berth_storage::queries::versions;
use berth_storage::Database;
use berth_test_utils::archive::{manifest_document, ArchiveFixture};
use berth_test_utils::{MemoryBlobStore, MockEngine};

const OWNER: UserId = UserId(1);
const STRANGER: UserId = UserId(2);

struct Harness {
    registry: VersionRegistry,
    db: Arc<Database>,
    engine: Arc<MockEngine>,
    blobs: Arc<MemoryBlobStore>,
}

async fn harness() -> Harness {
    let db = Arc::new(Database::open_in_memory().await.unwrap());
    let engine = Arc::new(MockEngine::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let registry = VersionRegistry::new(db.clone(), engine.clone(), blobs.clone());
    Harness {
        registry,
        db,
        engine,
        blobs,
    }
}

async fn ingest(name: &str, version: &str) -> PackageDescriptor {
    ingest_with_deps(name, version, &[]).await
}

async fn ingest_with_deps(
    name: &str,
    version: &str,
    deps: &[(&str, &str)],
) -> PackageDescriptor {
    let bytes = ArchiveFixture::package_with_dependencies(name, version, deps).build();
    ArchiveIngestor::new().begin(bytes.as_slice()).await.unwrap()
}

#[tokio::test]
async fn round_trip_register_upload_release() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("chart-tools", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();

    let (_, first) = h
        .registry
        .write_version(plugin.id, ingest("chart-tools", "1.0.0").await, OWNER, None)
        .await
        .unwrap();
    let (_, second) = h
        .registry
        .write_version(plugin.id, ingest("chart-tools", "1.0.1").await, OWNER, None)
        .await
        .unwrap();

    let (plugin, released) = h.registry.release_version(second.id, OWNER, None).await.unwrap();
    assert_eq!(released.state, VersionState::Released);
    assert_eq!(plugin.last_released_public_version_id, Some(released.id));
    assert_eq!(plugin.last_released_private_version_id, None);

    let rows = versions::list_for_plugin(&h.db, plugin.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first.id);
    assert_eq!(rows[0].state, VersionState::Unreleased);
    assert_eq!(rows[1].state, VersionState::Released);
}

#[tokio::test]
async fn duplicate_version_is_bad_regardless_of_release_state() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("dup", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let (_, version) = h
        .registry
        .write_version(plugin.id, ingest("dup", "1.0.0").await, OWNER, None)
        .await
        .unwrap();

    let err = h
        .registry
        .write_version(plugin.id, ingest("dup", "1.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::BadVersion(_)));

    h.registry.release_version(version.id, OWNER, None).await.unwrap();
    let err = h
        .registry
        .write_version(plugin.id, ingest("dup", "1.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::BadVersion(_)));
}

#[tokio::test]
async fn lower_version_after_higher_is_rejected() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("order", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    h.registry
        .write_version(plugin.id, ingest("order", "2.0.0").await, OWNER, None)
        .await
        .unwrap();

    // Unreleased versions still anchor the ordering rule.
    let err = h
        .registry
        .write_version(plugin.id, ingest("order", "1.9.9").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::BadVersion(_)));

    h.registry
        .write_version(plugin.id, ingest("order", "2.0.1").await, OWNER, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn writer_must_own_the_plugin() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("owned", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let err = h
        .registry
        .write_version(plugin.id, ingest("owned", "1.0.0").await, STRANGER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ForbiddenAction));
}

#[tokio::test]
async fn rejected_manifest_is_surfaced() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("schema", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    h.engine.reject_manifests("field `schema` is malformed").await;

    let err = h
        .registry
        .write_version(plugin.id, ingest("schema", "1.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    match err {
        RegistryError::ManifestInvalid(message) => {
            assert!(message.contains("malformed"));
        }
        other => panic!("expected ManifestInvalid, got {other:?}"),
    }
}

#[tokio::test]
async fn unresolvable_upstream_closure_is_a_missing_dependency() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("lonely", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    h.engine.fail_upstream().await;

    let err = h
        .registry
        .write_version(plugin.id, ingest("lonely", "1.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ManifestDependencyMissing(_)));
}

#[tokio::test]
async fn dependencies_must_be_released_and_are_recorded_as_edges() {
    let h = harness().await;
    let base = h
        .registry
        .register_plugin("base", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let (_, base_version) = h
        .registry
        .write_version(base.id, ingest("base", "2.0.0").await, OWNER, None)
        .await
        .unwrap();

    let app = h
        .registry
        .register_plugin("app", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();

    // Unreleased dependencies are invisible.
    let err = h
        .registry
        .write_version(
            app.id,
            ingest_with_deps("app", "1.0.0", &[("base", "2.0.0")]).await,
            OWNER,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::ManifestDependencyMissing(_)));

    h.registry.release_version(base_version.id, OWNER, None).await.unwrap();
    let (_, app_version) = h
        .registry
        .write_version(
            app.id,
            ingest_with_deps("app", "1.0.0", &[("base", "2.0.0")]).await,
            OWNER,
            None,
        )
        .await
        .unwrap();

    let edges = dependencies::list_for_version(&h.db, app_version.id).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].dependency_name, "base");
    assert_eq!(edges[0].dependency_version, "2.0.0");
    assert_eq!(edges[0].depends_on_version_id, base_version.id);
    assert_eq!(edges[0].dependent_name, "app");
    assert!(edges[0].is_primary);
}

#[tokio::test]
async fn private_dependencies_stay_within_one_organization() {
    let h = harness().await;
    let lib = h
        .registry
        .register_plugin("corp-lib", Visibility::Private, PluginOwner::Org(OrgId(10)))
        .await
        .unwrap();
    let (_, lib_version) = h
        .registry
        .write_version(lib.id, ingest("corp-lib", "1.0.0").await, OWNER, Some(OrgId(10)))
        .await
        .unwrap();
    h.registry
        .release_version(lib_version.id, OWNER, Some(OrgId(10)))
        .await
        .unwrap();

    // A different organization's private plugin may not depend on it.
    let outsider = h
        .registry
        .register_plugin("other-app", Visibility::Private, PluginOwner::Org(OrgId(11)))
        .await
        .unwrap();
    let err = h
        .registry
        .write_version(
            outsider.id,
            ingest_with_deps("other-app", "1.0.0", &[("corp-lib", "1.0.0")]).await,
            OWNER,
            Some(OrgId(11)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DependencyPermission(_)));

    // The owning organization may.
    let insider = h
        .registry
        .register_plugin("corp-app", Visibility::Private, PluginOwner::Org(OrgId(10)))
        .await
        .unwrap();
    h.registry
        .write_version(
            insider.id,
            ingest_with_deps("corp-app", "1.0.0", &[("corp-lib", "1.0.0")]).await,
            OWNER,
            Some(OrgId(10)),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_over_a_release_records_compatibility() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("compat", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let (_, first) = h
        .registry
        .write_version(plugin.id, ingest("compat", "1.0.0").await, OWNER, None)
        .await
        .unwrap();
    assert_eq!(first.is_backwards_compatible, None);
    assert_eq!(first.previous_release_version, None);

    h.registry.release_version(first.id, OWNER, None).await.unwrap();
    let (_, second) = h
        .registry
        .write_version(plugin.id, ingest("compat", "1.1.0").await, OWNER, None)
        .await
        .unwrap();
    assert_eq!(second.is_backwards_compatible, Some(true));
    assert_eq!(second.previous_release_version, Some("1.0.0".to_string()));
}

#[tokio::test]
async fn incompatible_and_undecidable_updates_are_refused() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("breaking", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let (_, first) = h
        .registry
        .write_version(plugin.id, ingest("breaking", "1.0.0").await, OWNER, None)
        .await
        .unwrap();
    h.registry.release_version(first.id, OWNER, None).await.unwrap();

    h.engine.set_compatibility(Compatibility::Incompatible).await;
    let err = h
        .registry
        .write_version(plugin.id, ingest("breaking", "2.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::IncompatibleUpdate));

    // An engine that cannot decide fails the write rather than guessing.
    h.engine.set_compatibility(Compatibility::Unknown).await;
    let err = h
        .registry
        .write_version(plugin.id, ingest("breaking", "2.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unknown(_)));
}

#[tokio::test]
async fn blob_failure_aborts_before_any_row_is_written() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("blobless", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    h.blobs.set_failing(true).await;

    let err = h
        .registry
        .write_version(plugin.id, ingest("blobless", "1.0.0").await, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unknown(_)));
    assert!(versions::list_for_plugin(&h.db, plugin.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn blob_store_receives_the_full_package_layout() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("layout", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();

    // Manifest with a field pointing at a static asset, to observe the
    // published-path rewrite.
    let mut document = manifest_document("layout", "1.0.0", &[]);
    document
        .as_object_mut()
        .unwrap()
        .insert("dataSource".to_string(), "assets/data.json".into());
    let bytes = ArchiveFixture::new()
        .manifest(&document)
        .text("icon.svg", berth_test_utils::archive::SVG_ICON)
        .text(
            "index.html",
            &berth_test_utils::archive::entry_html("layout", "1.0.0", "main.js"),
        )
        .text("main.js", berth_test_utils::archive::ENTRY_JS)
        .text("assets/data.json", "{\"rows\":[]}")
        .build();
    let descriptor = ArchiveIngestor::new().begin(bytes.as_slice()).await.unwrap();
    let upload_id = descriptor.upload_id.clone();
    let icon_hash = descriptor.icons.light.hash.clone();

    let (_, version) = h
        .registry
        .write_version(plugin.id, descriptor, OWNER, None)
        .await
        .unwrap();
    assert_eq!(version.upload_hash, upload_id.to_string());

    let stored = h.blobs.upload(&upload_id).await.unwrap();
    assert!(!stored.tar.is_empty(), "raw archive should be persisted");
    assert!(stored.files.contains_key("index.html"));
    assert!(stored.files.contains_key("main.js"));
    assert!(stored.files.contains_key(&format!("icons/{icon_hash}.svg")));
    assert!(stored.files.contains_key("assets/data.json"));

    let manifest = match &stored.files["manifest.json"] {
        berth_core::FileContent::Text(text) => {
            serde_json::from_str::<serde_json::Value>(text).unwrap()
        }
        other => panic!("manifest should be text, got {other:?}"),
    };
    assert_eq!(
        manifest["dataSource"],
        format!("{upload_id}/assets/data.json")
    );
}

#[tokio::test]
async fn release_rules_are_enforced() {
    let h = harness().await;
    let plugin = h
        .registry
        .register_plugin("rules", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();
    let (_, old) = h
        .registry
        .write_version(plugin.id, ingest("rules", "1.0.0").await, OWNER, None)
        .await
        .unwrap();
    let (_, newest) = h
        .registry
        .write_version(plugin.id, ingest("rules", "1.1.0").await, OWNER, None)
        .await
        .unwrap();

    // Only the newest version may be released.
    assert!(matches!(
        h.registry.release_version(old.id, OWNER, None).await.unwrap_err(),
        RegistryError::ForbiddenAction
    ));
    // Only the owner may release.
    assert!(matches!(
        h.registry.release_version(newest.id, STRANGER, None).await.unwrap_err(),
        RegistryError::ForbiddenAction
    ));
    // Releasing twice is an illegal state.
    h.registry.release_version(newest.id, OWNER, None).await.unwrap();
    assert!(matches!(
        h.registry.release_version(newest.id, OWNER, None).await.unwrap_err(),
        RegistryError::IllegalState(_)
    ));
    // Unknown ids are not found.
    assert!(matches!(
        h.registry.release_version(9999, OWNER, None).await.unwrap_err(),
        RegistryError::NotFound
    ));
}

#[tokio::test]
async fn registration_outcomes() {
    let h = harness().await;
    h.registry
        .register_plugin("Taken Name", Visibility::Public, PluginOwner::User(OWNER))
        .await
        .unwrap();

    // Key derivation makes the collision case-insensitive.
    assert!(matches!(
        h.registry
            .register_plugin("taken name", Visibility::Public, PluginOwner::User(STRANGER))
            .await
            .unwrap_err(),
        RegistryError::NameTaken
    ));
    assert!(matches!(
        h.registry
            .register_plugin("", Visibility::Public, PluginOwner::User(OWNER))
            .await
            .unwrap_err(),
        RegistryError::InvalidParams(_)
    ));
    assert!(matches!(
        h.registry
            .register_plugin("plugins", Visibility::Public, PluginOwner::User(OWNER))
            .await
            .unwrap_err(),
        RegistryError::InvalidParams(_)
    ));
}
