// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Berth registry crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for one upload, generated when ingestion begins.
///
/// Doubles as the scratch-archive name and the blob-store key prefix under
/// which the package's files are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadId(pub String);

impl UploadId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for UploadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an already-authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier of an organization the caller acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(pub i64);

/// Whether a plugin is listed publicly or restricted to its owner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }
}

/// Lifecycle state of a stored plugin version.
///
/// Versions are created `Unreleased`, become `Released` exactly once, and can
/// be taken out of circulation as `Cancelled` through moderation. `Cancelled`
/// is terminal; cancelled versions are invisible to ordering checks and to
/// dependents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    Unreleased,
    Released,
    Cancelled,
}

/// Verdict of the engine's update-compatibility check between two manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// The newer manifest is a backwards-compatible successor.
    Compatible,
    /// The newer manifest breaks the published contract.
    Incompatible,
    /// The engine could not determine an answer.
    Unknown,
}

/// The owning principal of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginOwner {
    User(UserId),
    Org(OrgId),
}

impl PluginOwner {
    /// Whether the given caller identity holds this owner: user-owned plugins
    /// require the matching user, org-owned plugins require the caller to act
    /// for the matching organization.
    pub fn is_held_by(&self, user: UserId, org: Option<OrgId>) -> bool {
        match self {
            Self::User(owner) => *owner == user,
            Self::Org(owner) => org == Some(*owner),
        }
    }
}

/// Outcome of the engine's manifest validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestVerdict {
    Accepted,
    Rejected { message: String },
}

/// File payload carried out of ingestion and into the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
