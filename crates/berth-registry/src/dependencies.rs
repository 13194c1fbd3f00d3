// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency closure coalescing and the private-visibility policy.

use std::collections::BTreeMap;

use berth_core::PluginManifest;
use berth_storage::Plugin;

use crate::error::RegistryError;
use crate::naming::derive_name_key;

/// One dependency after coalescing: the single maximum version required of a
/// name across the whole transitive closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescedDependency {
    pub name: String,
    pub name_key: String,
    pub version: semver::Version,
    /// Declared directly in the dependent manifest, as opposed to pulled in
    /// transitively.
    pub is_primary: bool,
}

/// Reduces the transitive closure to one target version per dependency name,
/// dropping a self-reference if the closure contains one.
pub fn coalesce(
    manifest: &PluginManifest,
    closure: &[PluginManifest],
) -> Vec<CoalescedDependency> {
    let self_key = derive_name_key(&manifest.name);
    let primary_keys: Vec<String> = manifest
        .dependencies
        .keys()
        .map(|name| derive_name_key(name))
        .collect();

    let mut coalesced: BTreeMap<String, CoalescedDependency> = BTreeMap::new();
    for upstream in closure {
        let key = derive_name_key(&upstream.name);
        if key == self_key {
            continue;
        }
        let is_primary = primary_keys.contains(&key);
        match coalesced.get_mut(&key) {
            Some(existing) => {
                if upstream.version > existing.version {
                    existing.version = upstream.version.clone();
                }
                existing.is_primary |= is_primary;
            }
            None => {
                coalesced.insert(
                    key.clone(),
                    CoalescedDependency {
                        name: upstream.name.clone(),
                        name_key: key,
                        version: upstream.version.clone(),
                        is_primary,
                    },
                );
            }
        }
    }
    coalesced.into_values().collect()
}

/// Policy: a private plugin may only be depended on within its own tenant.
/// When either side is private the two must share visibility and owner.
pub fn check_private_boundary(
    dependent: &Plugin,
    dependency: &Plugin,
) -> Result<(), RegistryError> {
    if !dependent.is_private && !dependency.is_private {
        return Ok(());
    }
    if dependent.is_private != dependency.is_private {
        return Err(RegistryError::DependencyPermission(format!(
            "`{}` and `{}` do not share the same visibility",
            dependent.name, dependency.name
        )));
    }
    if dependent.owner != dependency.owner {
        return Err(RegistryError::DependencyPermission(format!(
            "private plugin `{}` is owned by a different tenant than `{}`",
            dependency.name, dependent.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::types::{OrgId, PluginOwner, UserId};
    use berth_test_utils::{manifest_with_dependencies, minimal_manifest};

    fn plugin(name: &str, owner: PluginOwner, is_private: bool) -> Plugin {
        Plugin {
            id: 1,
            name: name.to_string(),
            name_key: derive_name_key(name),
            owner,
            is_private,
            last_released_public_version_id: None,
            last_released_private_version_id: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn coalesce_keeps_maximum_version_per_name() {
        let manifest = manifest_with_dependencies("app", "1.0.0", &[("base", "1.0.0")]);
        let closure = vec![
            minimal_manifest("base", "1.0.0"),
            minimal_manifest("base", "1.4.0"),
            minimal_manifest("util", "0.3.0"),
            minimal_manifest("base", "1.2.0"),
        ];
        let coalesced = coalesce(&manifest, &closure);
        assert_eq!(coalesced.len(), 2);
        assert_eq!(coalesced[0].name, "base");
        assert_eq!(coalesced[0].version, semver::Version::new(1, 4, 0));
        assert!(coalesced[0].is_primary);
        assert_eq!(coalesced[1].name, "util");
        assert!(!coalesced[1].is_primary);
    }

    #[test]
    fn coalesce_drops_self_reference() {
        let manifest = minimal_manifest("app", "2.0.0");
        let closure = vec![minimal_manifest("App", "1.0.0"), minimal_manifest("base", "1.0.0")];
        let coalesced = coalesce(&manifest, &closure);
        assert_eq!(coalesced.len(), 1);
        assert_eq!(coalesced[0].name, "base");
    }

    #[test]
    fn primary_flag_survives_transitive_duplicates() {
        // `base` appears both as a direct declaration and transitively.
        let manifest = manifest_with_dependencies("app", "1.0.0", &[("base", "1.0.0")]);
        let closure = vec![minimal_manifest("base", "2.0.0"), minimal_manifest("base", "1.0.0")];
        let coalesced = coalesce(&manifest, &closure);
        assert_eq!(coalesced.len(), 1);
        assert!(coalesced[0].is_primary);
        assert_eq!(coalesced[0].version, semver::Version::new(2, 0, 0));
    }

    #[test]
    fn public_to_public_crosses_tenants_freely() {
        let a = plugin("a", PluginOwner::User(UserId(1)), false);
        let b = plugin("b", PluginOwner::User(UserId(2)), false);
        check_private_boundary(&a, &b).unwrap();
    }

    #[test]
    fn private_requires_same_org() {
        let a = plugin("a", PluginOwner::Org(OrgId(1)), true);
        let same = plugin("b", PluginOwner::Org(OrgId(1)), true);
        let other = plugin("c", PluginOwner::Org(OrgId(2)), true);

        check_private_boundary(&a, &same).unwrap();
        assert!(matches!(
            check_private_boundary(&a, &other),
            Err(RegistryError::DependencyPermission(_))
        ));
    }

    #[test]
    fn private_requires_same_user() {
        let a = plugin("a", PluginOwner::User(UserId(1)), true);
        let other = plugin("b", PluginOwner::User(UserId(2)), true);
        assert!(check_private_boundary(&a, &other).is_err());
    }

    #[test]
    fn mixed_visibility_is_rejected() {
        let private = plugin("a", PluginOwner::User(UserId(1)), true);
        let public = plugin("b", PluginOwner::User(UserId(1)), false);
        assert!(check_private_boundary(&private, &public).is_err());
        assert!(check_private_boundary(&public, &private).is_err());
    }
}
