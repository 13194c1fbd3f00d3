// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The version registry service.
//!
//! Owns the database plus the injected manifest-engine and blob-store
//! capabilities, and implements the three public operations: plugin
//! registration, version upload, and release.

use std::sync::Arc;

use tracing::{info, warn};

use berth_core::types::{OrgId, UserId, Visibility};
use berth_core::{
    BlobStore, Compatibility, ManifestEngine, ManifestVerdict, PluginManifest, PluginOwner,
    VersionState,
};
use berth_ingest::PackageDescriptor;
use berth_storage::queries::plugins::RegisterOutcome;
use berth_storage::queries::versions::{InsertOutcome, ReleaseOutcome};
use berth_storage::queries::{plugins, versions};
use berth_storage::{Database, DependencyEdge, NewPlugin, NewVersion, Plugin, PluginVersion};

use crate::dependencies::{check_private_boundary, coalesce};
use crate::error::RegistryError;
use crate::files::package_files;
use crate::naming::validate_name;

/// The registry over one database and its external capabilities.
pub struct VersionRegistry {
    db: Arc<Database>,
    engine: Arc<dyn ManifestEngine>,
    blobs: Arc<dyn BlobStore>,
}

impl VersionRegistry {
    pub fn new(
        db: Arc<Database>,
        engine: Arc<dyn ManifestEngine>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self { db, engine, blobs }
    }

    /// Claims a plugin name for an owner.
    pub async fn register_plugin(
        &self,
        name: &str,
        visibility: Visibility,
        owner: PluginOwner,
    ) -> Result<Plugin, RegistryError> {
        let name_key = validate_name(name)?;
        let outcome = plugins::register(
            &self.db,
            NewPlugin {
                name: name.to_string(),
                name_key,
                owner,
                is_private: visibility.is_private(),
            },
        )
        .await?;
        match outcome {
            RegisterOutcome::Created(plugin) => {
                info!(plugin = %plugin.name, key = %plugin.name_key, "plugin registered");
                Ok(plugin)
            }
            RegisterOutcome::NameTaken => Err(RegistryError::NameTaken),
        }
    }

    /// Accepts a validated upload as the plugin's next version.
    ///
    /// Package files reach the blob store before the database transaction
    /// opens, so a crash in between can orphan files but never produces a
    /// version row pointing at missing files. The descriptor (and with it the
    /// scratch archive) is consumed and dropped on every path.
    pub async fn write_version(
        &self,
        plugin_id: i64,
        descriptor: PackageDescriptor,
        user: UserId,
        organization: Option<OrgId>,
    ) -> Result<(Plugin, PluginVersion), RegistryError> {
        match self.engine.validate_manifest(&descriptor.manifest).await {
            Ok(ManifestVerdict::Accepted) => {}
            Ok(ManifestVerdict::Rejected { message }) => {
                return Err(RegistryError::ManifestInvalid(message));
            }
            Err(e) => return Err(RegistryError::Unknown(e.to_string())),
        }

        let plugin = plugins::get(&self.db, plugin_id)
            .await?
            .ok_or(RegistryError::NotFound)?;
        if !plugin.owner.is_held_by(user, organization) {
            return Err(RegistryError::ForbiddenAction);
        }

        let closure = self
            .engine
            .upstream_manifests(&descriptor.manifest, true)
            .await
            .map_err(|e| RegistryError::ManifestDependencyMissing(e.to_string()))?;
        let edges = self
            .resolve_dependencies(&plugin, &descriptor.manifest, &closure)
            .await?;

        let (is_backwards_compatible, previous_release_version) = self
            .check_ordering(&plugin, &descriptor)
            .await?;

        self.persist_files(&descriptor).await?;

        let new = NewVersion {
            plugin_id: plugin.id,
            version: descriptor.version.clone(),
            is_backwards_compatible,
            previous_release_version,
            manifest_json: descriptor.manifest.document.to_string(),
            icon_light: descriptor.icons.light.hash.clone(),
            icon_dark: descriptor.icons.dark.hash.clone(),
            icon_selected_light: descriptor.icons.selected_light.hash.clone(),
            icon_selected_dark: descriptor.icons.selected_dark.hash.clone(),
            entry_document_ref: "index.html".to_string(),
            entry_script_ref: descriptor.entry_script.path.clone(),
            upload_hash: descriptor.upload_id.to_string(),
        };
        match versions::insert_with_dependencies(&self.db, new, edges).await? {
            InsertOutcome::Inserted { plugin, version } => {
                info!(
                    plugin = %plugin.name,
                    version = %version.version,
                    upload = %version.upload_hash,
                    "version written"
                );
                Ok((plugin, version))
            }
            InsertOutcome::PluginMissing => Err(RegistryError::NotFound),
            InsertOutcome::Duplicate { existing } => Err(RegistryError::BadVersion(format!(
                "version {existing} already exists"
            ))),
            InsertOutcome::NotMonotonic { latest } => Err(RegistryError::BadVersion(format!(
                "version must be greater than the latest version {latest}"
            ))),
        }
    }

    /// Flips the newest unreleased version to released and moves the owning
    /// plugin's back-pointer, all inside one transaction.
    pub async fn release_version(
        &self,
        version_id: i64,
        user: UserId,
        organization: Option<OrgId>,
    ) -> Result<(Plugin, PluginVersion), RegistryError> {
        let (plugin, _) = versions::get_with_plugin(&self.db, version_id)
            .await?
            .ok_or(RegistryError::NotFound)?;
        if !plugin.owner.is_held_by(user, organization) {
            return Err(RegistryError::ForbiddenAction);
        }

        match versions::release(&self.db, version_id).await? {
            ReleaseOutcome::Released { plugin, version } => {
                info!(plugin = %plugin.name, version = %version.version, "version released");
                Ok((plugin, version))
            }
            ReleaseOutcome::Missing => Err(RegistryError::NotFound),
            ReleaseOutcome::NotNewest { newest } => {
                warn!(version_id, newest = %newest, "refusing out-of-order release");
                Err(RegistryError::ForbiddenAction)
            }
            ReleaseOutcome::WrongState { state } => Err(RegistryError::IllegalState(format!(
                "version is {state}, only unreleased versions can be released"
            ))),
        }
    }

    /// Resolves each coalesced dependency to a released version row and
    /// enforces the private-visibility boundary.
    async fn resolve_dependencies(
        &self,
        plugin: &Plugin,
        manifest: &PluginManifest,
        closure: &[PluginManifest],
    ) -> Result<Vec<DependencyEdge>, RegistryError> {
        let mut edges = Vec::new();
        for dependency in coalesce(manifest, closure) {
            let version_text = dependency.version.to_string();
            let (dep_plugin, dep_version) =
                versions::released_by_name_key(&self.db, &dependency.name_key, &version_text)
                    .await?
                    .ok_or_else(|| {
                        RegistryError::ManifestDependencyMissing(format!(
                            "{} {} is not a released plugin version",
                            dependency.name, version_text
                        ))
                    })?;
            check_private_boundary(plugin, &dep_plugin)?;
            edges.push(DependencyEdge {
                depends_on_version_id: dep_version.id,
                dependency_name: dep_plugin.name,
                dependency_name_key: dep_plugin.name_key,
                dependency_version: dep_version.version,
                is_primary: dependency.is_primary,
            });
        }
        Ok(edges)
    }

    /// Pre-flight ordering and compatibility checks, before any file is
    /// written. The insert transaction re-checks ordering against a fresh
    /// read, so a concurrent writer cannot slip past this.
    async fn check_ordering(
        &self,
        plugin: &Plugin,
        descriptor: &PackageDescriptor,
    ) -> Result<(Option<bool>, Option<String>), RegistryError> {
        let existing = versions::list_for_plugin(&self.db, plugin.id).await?;

        let mut latest: Option<semver::Version> = None;
        let mut latest_released: Option<&PluginVersion> = None;
        let mut latest_released_version: Option<semver::Version> = None;
        for row in &existing {
            if row.version == descriptor.version.to_string() {
                return Err(RegistryError::BadVersion(format!(
                    "version {} already exists",
                    row.version
                )));
            }
            if row.state == VersionState::Cancelled {
                continue;
            }
            let parsed = semver::Version::parse(&row.version)
                .map_err(|e| RegistryError::Unknown(format!("stored version: {e}")))?;
            if latest.as_ref().is_none_or(|current| parsed > *current) {
                latest = Some(parsed.clone());
            }
            if row.state == VersionState::Released
                && latest_released_version
                    .as_ref()
                    .is_none_or(|current| parsed > *current)
            {
                latest_released = Some(row);
                latest_released_version = Some(parsed);
            }
        }

        if let Some(latest) = latest {
            if descriptor.version <= latest {
                return Err(RegistryError::BadVersion(format!(
                    "version must be greater than the latest version {latest}"
                )));
            }
        }

        let Some(released) = latest_released else {
            return Ok((None, None));
        };
        let previous = PluginManifest::from_document(
            serde_json::from_str(&released.manifest_json)
                .map_err(|e| RegistryError::Unknown(format!("stored manifest: {e}")))?,
        )
        .map_err(|e| RegistryError::Unknown(format!("stored manifest: {e}")))?;

        match self
            .engine
            .compatible_for_update(&previous, &descriptor.manifest)
            .await
        {
            Compatibility::Compatible => {
                Ok((Some(true), Some(released.version.clone())))
            }
            Compatibility::Incompatible => Err(RegistryError::IncompatibleUpdate),
            Compatibility::Unknown => Err(RegistryError::Unknown(
                "compatibility with the released version could not be determined".to_string(),
            )),
        }
    }

    /// Writes the raw archive and the package file map to the blob store.
    async fn persist_files(&self, descriptor: &PackageDescriptor) -> Result<(), RegistryError> {
        let archive = tokio::fs::File::open(descriptor.archive_path())
            .await
            .map_err(|e| RegistryError::Unknown(format!("scratch archive: {e}")))?;
        self.blobs
            .write_tar(&descriptor.upload_id, Box::new(archive))
            .await
            .map_err(|e| RegistryError::Unknown(e.to_string()))?;

        let files = package_files(descriptor);
        self.blobs
            .write_plugin_files(&descriptor.upload_id, &files)
            .await
            .map_err(|e| RegistryError::Unknown(e.to_string()))
    }
}
