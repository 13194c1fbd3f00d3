// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive ingestion pipeline for the Berth plugin registry.
//!
//! [`ArchiveIngestor`] takes an untrusted upload stream and produces either a
//! fully validated [`PackageDescriptor`] or a terminal [`IngestError`]. The
//! pipeline spools the stream to scratch storage, extracts the tar entries
//! under size ceilings, and validates the manifest, icons, entry document,
//! entry script, and static assets in that order.

pub mod archive;
pub mod descriptor;
pub mod entry;
pub mod error;
pub mod icons;
mod manifest;
mod spool;

pub use archive::{MAX_ENTRY_BYTES, MAX_TOTAL_BYTES};
pub use descriptor::{ArchiveIngestor, PackageDescriptor};
pub use entry::{EntryScript, PLUGIN_URL_BASE};
pub use error::IngestError;
pub use icons::{IconAsset, IconSet};
