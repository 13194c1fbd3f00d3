// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal error type for the ingestion pipeline.
//!
//! One variant per failure class; the first error aborts the remaining
//! stages. `Display` renders the single human-readable message reported back
//! to the uploader, who must correct the archive and upload again.

use berth_core::manifest::ManifestError;
use thiserror::Error;

/// Why an uploaded archive was rejected.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload stream could not be spooled to scratch storage.
    #[error("failed to receive the uploaded archive: {source}")]
    Spool {
        #[source]
        source: std::io::Error,
    },

    /// The scratch file is not a readable tar stream.
    #[error("the uploaded file is not a valid archive: {source}")]
    Archive {
        #[source]
        source: std::io::Error,
    },

    /// One entry exceeds the per-entry size ceiling.
    #[error("archive entry `{path}` is {size} bytes, over the {limit}-byte limit")]
    EntryTooLarge { path: String, size: u64, limit: u64 },

    /// The archive as a whole exceeds the cumulative size ceiling.
    #[error("archive exceeds the total size limit of {limit} bytes")]
    ArchiveTooLarge { limit: u64 },

    /// An entry path is absolute or escapes the archive root.
    #[error("archive entry `{path}` has an unsafe path")]
    UnsafePath { path: String },

    /// No `manifest.json` entry exists.
    #[error("archive is missing manifest.json")]
    ManifestMissing,

    /// `manifest.json` is not a JSON document.
    #[error("manifest.json is not valid JSON: {0}")]
    ManifestJson(String),

    /// The manifest document fails a field rule.
    #[error("{0}")]
    ManifestInvalid(#[from] ManifestError),

    /// The manifest declares no icon.
    #[error("manifest declares no icon")]
    IconMissing,

    /// An icon reference points at no archive entry.
    #[error("icon `{path}` referenced by the manifest is not in the archive")]
    IconNotFound { path: String },

    /// An icon entry is not parseable SVG.
    #[error("icon `{path}` is not valid SVG: {reason}")]
    IconInvalid { path: String, reason: String },

    /// No `index.html` entry exists.
    #[error("archive is missing index.html")]
    EntryDocumentMissing,

    /// The `index.html` entry is not usable markup.
    #[error("index.html is not a valid HTML document: {reason}")]
    EntryDocumentInvalid { reason: String },

    /// The entry document carries no plugin script URL for this
    /// name/version.
    #[error("index.html does not reference a plugin script for {name} {version}")]
    EntryScriptUnreferenced { name: String, version: String },

    /// The referenced script path points at no archive entry.
    #[error("entry script `{path}` referenced by index.html is not in the archive")]
    EntryScriptNotFound { path: String },

    /// The referenced script fails module syntax validation.
    #[error("entry script `{path}` is not a valid module: {reason}")]
    EntryScriptInvalid { path: String, reason: String },
}
