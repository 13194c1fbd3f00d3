// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest stage: locate, parse, and consume `manifest.json`.

use berth_core::PluginManifest;

use crate::archive::EntryTable;
use crate::error::IngestError;

pub(crate) const MANIFEST_PATH: &str = "manifest.json";

/// Takes the manifest entry out of the table and lifts it into its typed
/// form. The raw bytes are dropped here; the table keeps only what later
/// stages still need.
pub(crate) fn take_manifest(entries: &mut EntryTable) -> Result<PluginManifest, IngestError> {
    let bytes = entries
        .remove(MANIFEST_PATH)
        .ok_or(IngestError::ManifestMissing)?;
    let document: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| IngestError::ManifestJson(e.to_string()))?;
    Ok(PluginManifest::from_document(document)?)
}
