// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest engine trait for the external schema-compatibility service.

use async_trait::async_trait;

use crate::error::BerthError;
use crate::manifest::PluginManifest;
use crate::types::{Compatibility, ManifestVerdict};

/// The external engine that understands manifest documents beyond the fields
/// the registry lifts.
///
/// The registry calls it as a black box for three judgements: whether a
/// manifest is well-formed, which upstream manifests its dependency
/// declarations resolve to, and whether one manifest is a compatible
/// successor of another.
#[async_trait]
pub trait ManifestEngine: Send + Sync + 'static {
    /// Judges a manifest document against the engine's schema rules.
    async fn validate_manifest(
        &self,
        manifest: &PluginManifest,
    ) -> Result<ManifestVerdict, BerthError>;

    /// Resolves the manifest's declared dependencies to the full transitive
    /// set of upstream manifests.
    ///
    /// With `strict` set, any dependency that cannot be resolved fails the
    /// whole call instead of being silently dropped.
    async fn upstream_manifests(
        &self,
        manifest: &PluginManifest,
        strict: bool,
    ) -> Result<Vec<PluginManifest>, BerthError>;

    /// Judges whether `next` is a backwards-compatible successor of
    /// `previous`. Engines that cannot decide answer
    /// [`Compatibility::Unknown`] rather than failing.
    async fn compatible_for_update(
        &self,
        previous: &PluginManifest,
        next: &PluginManifest,
    ) -> Compatibility;
}
