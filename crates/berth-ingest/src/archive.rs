// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tar extraction under size ceilings.
//!
//! Entries are buffered into an in-memory table keyed by their normalized
//! path. Extraction is fail-soft: the first violation is recorded and no
//! further entry data is buffered, but the loop keeps walking the remaining
//! headers so the whole stream is consumed before the error is returned.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Component, Path};

use tracing::{debug, warn};

use crate::error::IngestError;

/// Ceiling for one entry's declared size.
pub const MAX_ENTRY_BYTES: u64 = 5 * 1024 * 1024;

/// Ceiling for the declared sizes of all entries combined.
pub const MAX_TOTAL_BYTES: u64 = 20 * 1024 * 1024;

/// The in-memory entry table produced by extraction.
pub(crate) type EntryTable = BTreeMap<String, Vec<u8>>;

/// Walks the scratch archive and buffers its regular-file entries.
///
/// Blocking; the caller runs this under `spawn_blocking`.
pub(crate) fn extract_entries(scratch: &Path) -> Result<EntryTable, IngestError> {
    let file = std::fs::File::open(scratch).map_err(|source| IngestError::Spool { source })?;
    let mut archive = tar::Archive::new(file);

    let mut entries = EntryTable::new();
    let mut total: u64 = 0;
    let mut first_error: Option<IngestError> = None;

    let iter = archive
        .entries()
        .map_err(|source| IngestError::Archive { source })?;
    for entry in iter {
        let mut entry = entry.map_err(|source| IngestError::Archive { source })?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        // Once flagged, keep draining headers but stop buffering data.
        if first_error.is_some() {
            continue;
        }

        let path = match entry.path() {
            Ok(path) => path.into_owned(),
            Err(source) => {
                first_error = Some(IngestError::Archive { source });
                continue;
            }
        };
        let Some(normalized) = normalize_path(&path) else {
            warn!(path = %path.display(), "rejecting unsafe archive entry path");
            first_error = Some(IngestError::UnsafePath {
                path: path.display().to_string(),
            });
            continue;
        };

        let declared = entry.size();
        if declared > MAX_ENTRY_BYTES {
            first_error = Some(IngestError::EntryTooLarge {
                path: normalized,
                size: declared,
                limit: MAX_ENTRY_BYTES,
            });
            continue;
        }
        total += declared;
        if total > MAX_TOTAL_BYTES {
            first_error = Some(IngestError::ArchiveTooLarge {
                limit: MAX_TOTAL_BYTES,
            });
            continue;
        }

        let mut data = Vec::with_capacity(declared as usize);
        if let Err(source) = entry.read_to_end(&mut data) {
            first_error = Some(IngestError::Archive { source });
            continue;
        }
        entries.insert(normalized, data);
    }

    if let Some(error) = first_error {
        return Err(error);
    }
    debug!(entries = entries.len(), total_bytes = total, "archive extracted");
    Ok(entries)
}

/// Normalizes an entry path to a forward-slash relative string, or `None`
/// when the path is absolute or climbs out of the archive root.
fn normalize_path(path: &Path) -> Option<String> {
    if path.is_absolute() {
        return None;
    }
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
