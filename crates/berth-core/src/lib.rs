// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Berth plugin registry.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Berth workspace. The ingestion pipeline
//! and the version registry both build on the manifest model and capability
//! traits defined here.

pub mod error;
pub mod manifest;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BerthError;
pub use manifest::{IconRefs, ManifestError, PluginManifest};
pub use types::{
    Compatibility, FileContent, ManifestVerdict, OrgId, PluginOwner, UploadId, UserId,
    VersionState, Visibility,
};

// Re-export the capability traits at crate root.
pub use traits::{BlobStore, ManifestEngine};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn berth_error_has_all_variants() {
        // Verify all 5 error variants exist and can be constructed.
        let _config = BerthError::Config("test".into());
        let _storage = BerthError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _blobs = BerthError::BlobStore {
            message: "test".into(),
            source: None,
        };
        let _engine = BerthError::Engine {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _internal = BerthError::Internal("test".into());
    }

    #[test]
    fn visibility_and_state_round_trip_as_lowercase() {
        use std::str::FromStr;

        assert_eq!(Visibility::Private.to_string(), "private");
        assert_eq!(Visibility::from_str("public").unwrap(), Visibility::Public);

        let states = [
            VersionState::Unreleased,
            VersionState::Released,
            VersionState::Cancelled,
        ];
        for state in &states {
            let s = state.to_string();
            assert_eq!(s, s.to_lowercase());
            let parsed = VersionState::from_str(&s).expect("should parse back");
            assert_eq!(*state, parsed);
        }
    }

    #[test]
    fn version_state_serialization() {
        let state = VersionState::Released;
        let json = serde_json::to_string(&state).expect("should serialize");
        assert_eq!(json, "\"released\"");
        let parsed: VersionState = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(state, parsed);
    }

    #[test]
    fn owner_identity_checks() {
        let user_owned = PluginOwner::User(UserId(7));
        assert!(user_owned.is_held_by(UserId(7), None));
        assert!(user_owned.is_held_by(UserId(7), Some(OrgId(1))));
        assert!(!user_owned.is_held_by(UserId(8), None));

        let org_owned = PluginOwner::Org(OrgId(3));
        assert!(org_owned.is_held_by(UserId(7), Some(OrgId(3))));
        assert!(!org_owned.is_held_by(UserId(7), Some(OrgId(4))));
        assert!(!org_owned.is_held_by(UserId(7), None));
    }

    #[test]
    fn upload_ids_are_unique() {
        let a = UploadId::generate();
        let b = UploadId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.0);
    }

    #[test]
    fn file_content_byte_views() {
        let text = FileContent::Text("héllo".into());
        assert_eq!(text.as_bytes(), "héllo".as_bytes());
        assert_eq!(text.len(), 6);

        let bytes = FileContent::Bytes(vec![0, 159, 146, 150]);
        assert_eq!(bytes.len(), 4);
        assert!(!bytes.is_empty());
        assert!(FileContent::Bytes(Vec::new()).is_empty());
    }

    #[test]
    fn capability_traits_are_object_safe() {
        // If either trait loses object safety this stops compiling.
        fn _assert_engine(_: &dyn ManifestEngine) {}
        fn _assert_blobs(_: &dyn BlobStore) {}
    }
}
