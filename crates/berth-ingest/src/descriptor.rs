// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The validated package descriptor and the ingestor that produces it.

use std::collections::BTreeMap;
use std::path::Path;

use tempfile::TempPath;
use tokio::io::AsyncRead;
use tracing::info;

use berth_core::{FileContent, PluginManifest, UploadId};

use crate::archive;
use crate::entry::{self, EntryScript};
use crate::error::IngestError;
use crate::icons::{self, IconSet};
use crate::manifest;
use crate::spool;

/// The normalized result of a successful ingestion: everything the version
/// registry needs, and nothing that failed validation.
///
/// Holds the scratch archive via a [`TempPath`], so dropping the descriptor
/// removes the temp file on every exit path.
#[derive(Debug)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: semver::Version,
    pub display_name: String,
    pub description: String,
    pub manifest: PluginManifest,
    pub icons: IconSet,
    pub entry_document: String,
    pub entry_script: EntryScript,
    pub static_assets: BTreeMap<String, FileContent>,
    pub upload_id: UploadId,
    scratch: TempPath,
}

impl PackageDescriptor {
    /// Location of the spooled raw archive. Valid until the descriptor is
    /// dropped.
    pub fn archive_path(&self) -> &Path {
        &self.scratch
    }
}

/// Runs the upload validation pipeline. One instance per upload.
#[derive(Debug, Default)]
pub struct ArchiveIngestor {
    _private: (),
}

impl ArchiveIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the upload stream and produces a fully validated descriptor,
    /// or the first terminal error.
    ///
    /// Stages run in order: spool, extract, manifest, icons, entry document
    /// and script, static assets. Each stage consumes the table entries it
    /// validated, so memory is reclaimed as the pipeline advances.
    pub async fn begin<R>(self, reader: R) -> Result<PackageDescriptor, IngestError>
    where
        R: AsyncRead + Unpin,
    {
        let upload_id = UploadId::generate();
        let scratch = spool::spool_to_scratch(reader).await?;

        let scratch_location = scratch.to_path_buf();
        let mut entries = tokio::task::spawn_blocking(move || {
            archive::extract_entries(&scratch_location)
        })
        .await
        .map_err(|e| IngestError::Archive {
            source: std::io::Error::other(e),
        })??;

        let manifest = manifest::take_manifest(&mut entries)?;
        let icons = icons::take_icons(manifest.icon.as_ref(), &mut entries)?;
        let (entry_document, entry_script) =
            entry::take_entry(&manifest.name, &manifest.version, &mut entries)?;
        let static_assets = entry::collect_assets(entries);

        info!(
            upload = %upload_id,
            name = %manifest.name,
            version = %manifest.version,
            assets = static_assets.len(),
            "upload validated"
        );
        Ok(PackageDescriptor {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            display_name: manifest.display_name.clone(),
            description: manifest.description.clone(),
            manifest,
            icons,
            entry_document,
            entry_script,
            static_assets,
            upload_id,
            scratch,
        })
    }
}
