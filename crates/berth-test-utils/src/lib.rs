// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Berth workspace.
//!
//! Provides a scriptable mock of the external manifest engine, an in-memory
//! blob store that records its writes, and a tar archive fixture builder for
//! exercising the ingestion pipeline without touching real uploads.

pub mod archive;
pub mod memory_blobstore;
pub mod mock_engine;

pub use archive::ArchiveFixture;
pub use memory_blobstore::MemoryBlobStore;
pub use mock_engine::MockEngine;

use berth_core::PluginManifest;
use serde_json::json;

/// Builds the smallest valid manifest for a name/version pair.
pub fn minimal_manifest(name: &str, version: &str) -> PluginManifest {
    manifest_with_dependencies(name, version, &[])
}

/// Builds a valid manifest declaring the given dependencies.
pub fn manifest_with_dependencies(
    name: &str,
    version: &str,
    dependencies: &[(&str, &str)],
) -> PluginManifest {
    let deps: serde_json::Map<String, serde_json::Value> = dependencies
        .iter()
        .map(|(dep, req)| (dep.to_string(), json!(req)))
        .collect();
    let document = json!({
        "name": name,
        "version": version,
        "displayName": name,
        "description": format!("{name} test fixture"),
        "icon": "icon.svg",
        "dependencies": deps,
    });
    PluginManifest::from_document(document).expect("fixture manifest should be valid")
}
