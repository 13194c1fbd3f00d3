// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable mock of the external manifest engine.
//!
//! `MockEngine` implements `ManifestEngine` with programmable answers,
//! enabling registry tests without the real schema-compatibility service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use berth_core::{BerthError, Compatibility, ManifestEngine, ManifestVerdict, PluginManifest};

use crate::minimal_manifest;

/// A mock manifest engine with programmable verdicts.
///
/// By default every manifest is accepted, upstream resolution derives one
/// minimal manifest per declared dependency, and every update is judged
/// compatible.
pub struct MockEngine {
    verdict: Mutex<ManifestVerdict>,
    compatibility: Mutex<Compatibility>,
    /// Scripted transitive closures keyed by manifest name; absent names get
    /// the default derivation from declared dependencies.
    closures: Mutex<BTreeMap<String, Vec<PluginManifest>>>,
    fail_upstream: Mutex<bool>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            verdict: Mutex::new(ManifestVerdict::Accepted),
            compatibility: Mutex::new(Compatibility::Compatible),
            closures: Mutex::new(BTreeMap::new()),
            fail_upstream: Mutex::new(false),
        }
    }

    /// Makes `validate_manifest` reject with the given message.
    pub async fn reject_manifests(&self, message: &str) {
        *self.verdict.lock().await = ManifestVerdict::Rejected {
            message: message.to_string(),
        };
    }

    /// Sets the compatibility answer for every following update check.
    pub async fn set_compatibility(&self, compatibility: Compatibility) {
        *self.compatibility.lock().await = compatibility;
    }

    /// Scripts the transitive closure returned for manifests named `name`.
    pub async fn set_closure(&self, name: &str, closure: Vec<PluginManifest>) {
        self.closures.lock().await.insert(name.to_string(), closure);
    }

    /// Makes every following `upstream_manifests` call fail.
    pub async fn fail_upstream(&self) {
        *self.fail_upstream.lock().await = true;
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManifestEngine for MockEngine {
    async fn validate_manifest(
        &self,
        _manifest: &PluginManifest,
    ) -> Result<ManifestVerdict, BerthError> {
        Ok(self.verdict.lock().await.clone())
    }

    async fn upstream_manifests(
        &self,
        manifest: &PluginManifest,
        _strict: bool,
    ) -> Result<Vec<PluginManifest>, BerthError> {
        if *self.fail_upstream.lock().await {
            return Err(BerthError::Engine {
                message: "scripted upstream resolution failure".to_string(),
                source: None,
            });
        }
        if let Some(closure) = self.closures.lock().await.get(&manifest.name) {
            return Ok(closure.clone());
        }
        Ok(manifest
            .dependencies
            .iter()
            .map(|(name, version)| minimal_manifest(name, version))
            .collect())
    }

    async fn compatible_for_update(
        &self,
        _previous: &PluginManifest,
        _next: &PluginManifest,
    ) -> Compatibility {
        *self.compatibility.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_engine_accepts_and_derives_upstream() {
        let engine = MockEngine::new();
        let manifest =
            crate::manifest_with_dependencies("chart-tools", "1.0.0", &[("base", "2.0.0")]);

        let verdict = engine.validate_manifest(&manifest).await.unwrap();
        assert_eq!(verdict, ManifestVerdict::Accepted);

        let upstream = engine.upstream_manifests(&manifest, true).await.unwrap();
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].name, "base");
        assert_eq!(upstream[0].version, semver::Version::new(2, 0, 0));

        let compat = engine.compatible_for_update(&manifest, &manifest).await;
        assert_eq!(compat, Compatibility::Compatible);
    }

    #[tokio::test]
    async fn scripted_answers_override_defaults() {
        let engine = MockEngine::new();
        let manifest = crate::minimal_manifest("chart-tools", "1.0.0");

        engine.reject_manifests("schema mismatch").await;
        let verdict = engine.validate_manifest(&manifest).await.unwrap();
        assert_eq!(
            verdict,
            ManifestVerdict::Rejected {
                message: "schema mismatch".to_string()
            }
        );

        engine.fail_upstream().await;
        assert!(engine.upstream_manifests(&manifest, true).await.is_err());

        engine.set_compatibility(Compatibility::Incompatible).await;
        let compat = engine.compatible_for_update(&manifest, &manifest).await;
        assert_eq!(compat, Compatibility::Incompatible);
    }
}
