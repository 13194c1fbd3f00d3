// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Icon stage: resolve the manifest's icon references, validate each as SVG,
//! and derive content-hash storage names.

use std::collections::BTreeMap;

use berth_core::manifest::IconRefs;
use sha2::{Digest, Sha256};

use crate::archive::EntryTable;
use crate::error::IngestError;

/// One validated icon artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAsset {
    /// Path of the source entry inside the archive.
    pub source_path: String,
    /// SHA-256 hex digest over the raw SVG bytes; used as the storage
    /// filename.
    pub hash: String,
    pub bytes: Vec<u8>,
}

/// The four rendered icon variants, in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    pub light: IconAsset,
    pub dark: IconAsset,
    pub selected_light: IconAsset,
    pub selected_dark: IconAsset,
}

impl IconSet {
    /// Storage filename for each variant, `icons/<hash>.svg`.
    pub fn storage_paths(&self) -> [(String, &IconAsset); 4] {
        [
            (format!("icons/{}.svg", self.light.hash), &self.light),
            (format!("icons/{}.svg", self.dark.hash), &self.dark),
            (
                format!("icons/{}.svg", self.selected_light.hash),
                &self.selected_light,
            ),
            (
                format!("icons/{}.svg", self.selected_dark.hash),
                &self.selected_dark,
            ),
        ]
    }
}

/// Resolves the manifest icon references against the entry table, consuming
/// each referenced entry. A single reference serves all four variants.
pub(crate) fn take_icons(
    icon: Option<&IconRefs>,
    entries: &mut EntryTable,
) -> Result<IconSet, IngestError> {
    let icon = icon.ok_or(IngestError::IconMissing)?;
    // Variants may share a path; each entry is consumed once and reused.
    let mut resolved: BTreeMap<String, IconAsset> = BTreeMap::new();
    let mut resolve = |path: &str, entries: &mut EntryTable| -> Result<IconAsset, IngestError> {
        if let Some(asset) = resolved.get(path) {
            return Ok(asset.clone());
        }
        let bytes = entries
            .remove(path)
            .ok_or_else(|| IngestError::IconNotFound {
                path: path.to_string(),
            })?;
        validate_svg(path, &bytes)?;
        let asset = IconAsset {
            source_path: path.to_string(),
            hash: hex::encode(Sha256::digest(&bytes)),
            bytes,
        };
        resolved.insert(path.to_string(), asset.clone());
        Ok(asset)
    };

    Ok(IconSet {
        light: resolve(icon.light(), entries)?,
        dark: resolve(icon.dark(), entries)?,
        selected_light: resolve(icon.selected_light(), entries)?,
        selected_dark: resolve(icon.selected_dark(), entries)?,
    })
}

/// Requires a parseable XML document with an `svg` root element.
fn validate_svg(path: &str, bytes: &[u8]) -> Result<(), IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|_| IngestError::IconInvalid {
        path: path.to_string(),
        reason: "not UTF-8".to_string(),
    })?;
    let document = roxmltree::Document::parse(text).map_err(|e| IngestError::IconInvalid {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    if document.root_element().tag_name().name() != "svg" {
        return Err(IngestError::IconInvalid {
            path: path.to_string(),
            reason: format!(
                "root element is `{}`, expected `svg`",
                document.root_element().tag_name().name()
            ),
        });
    }
    Ok(())
}
