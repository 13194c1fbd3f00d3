// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the registry's external collaborators.
//!
//! The registry treats manifest semantics and object storage as injected
//! capabilities. Both traits use `#[async_trait]` for dynamic dispatch
//! compatibility.

pub mod blobstore;
pub mod engine;

// Re-export both traits at the traits module level for convenience.
pub use blobstore::BlobStore;
pub use engine::ManifestEngine;
