// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version registry for the Berth plugin registry.
//!
//! [`VersionRegistry`] consumes validated package descriptors and maintains
//! the append-only, semver-monotonic version history: plugin name
//! registration, version writes with dependency resolution and compatibility
//! checks, and the one-way release transition. External judgements (manifest
//! validity, upstream resolution, update compatibility) come from an injected
//! `ManifestEngine`; package files go to an injected `BlobStore` before any
//! database row is written.

pub mod dependencies;
pub mod error;
pub mod files;
pub mod naming;
pub mod service;

pub use error::RegistryError;
pub use service::VersionRegistry;
