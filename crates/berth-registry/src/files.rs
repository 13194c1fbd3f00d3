// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the package file map written to the blob store.
//!
//! Everything is keyed by its path under the upload-id prefix: the manifest
//! (with asset references rewritten to their published locations), the four
//! hash-named icons, the entry document and script, and the static assets.

use std::collections::BTreeMap;

use berth_core::{FileContent, UploadId};
use berth_ingest::PackageDescriptor;

/// Builds the file map persisted for one accepted upload.
pub fn package_files(descriptor: &PackageDescriptor) -> BTreeMap<String, FileContent> {
    let mut files = BTreeMap::new();

    let manifest = rewrite_asset_refs(
        descriptor.manifest.document.clone(),
        &descriptor.upload_id,
        &descriptor.static_assets,
    );
    files.insert(
        "manifest.json".to_string(),
        FileContent::Text(manifest.to_string()),
    );

    for (path, icon) in descriptor.icons.storage_paths() {
        files.insert(path, FileContent::Bytes(icon.bytes.clone()));
    }

    files.insert(
        "index.html".to_string(),
        FileContent::Text(descriptor.entry_document.clone()),
    );
    files.insert(
        descriptor.entry_script.path.clone(),
        FileContent::Text(descriptor.entry_script.source.clone()),
    );

    for (path, content) in &descriptor.static_assets {
        files.insert(path.clone(), content.clone());
    }
    files
}

/// Rewrites manifest string values that name a static asset to their
/// upload-id-addressed published path.
fn rewrite_asset_refs(
    value: serde_json::Value,
    upload: &UploadId,
    assets: &BTreeMap<String, FileContent>,
) -> serde_json::Value {
    match value {
        serde_json::Value::String(text) if assets.contains_key(&text) => {
            serde_json::Value::String(format!("{upload}/{text}"))
        }
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(|item| rewrite_asset_refs(item, upload, assets))
                .collect(),
        ),
        serde_json::Value::Object(entries) => serde_json::Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, rewrite_asset_refs(item, upload, assets)))
                .collect(),
        ),
        other => other,
    }
}
