// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from JSON.
//!
//! A plugin manifest (`manifest.json`) describes a package's identity, icon
//! references, and declared dependencies. The typed [`PluginManifest`] lifts
//! the fields the registry interprets; the full document is retained verbatim
//! for storage and for the manifest engine, which understands the rest.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Why a manifest document could not be lifted into a [`PluginManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The document is not a JSON object.
    #[error("manifest is not a JSON object")]
    NotAnObject,

    /// A required field is absent, not a string, or empty after trimming.
    #[error("manifest field `{field}` is missing or empty")]
    MissingField { field: &'static str },

    /// The `version` field does not clean up to a valid semantic version.
    #[error("manifest version `{given}` is not a valid semantic version")]
    Version { given: String },

    /// The `icon` field is neither a path string nor a variant object.
    #[error("manifest `icon` field is neither a path nor a variant object")]
    IconShape,

    /// The `dependencies` field is not an object of name to version strings.
    #[error("manifest `dependencies` field is not a map of version strings")]
    DependencyShape,
}

/// Icon references declared by a manifest.
///
/// A single path serves all four rendered variants; the object form names
/// light and dark artwork for both the resting and selected states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRefs {
    Single(String),
    Variants {
        light: String,
        dark: String,
        selected_light: String,
        selected_dark: String,
    },
}

impl IconRefs {
    pub fn light(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Variants { light, .. } => light,
        }
    }

    pub fn dark(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Variants { dark, .. } => dark,
        }
    }

    pub fn selected_light(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Variants { selected_light, .. } => selected_light,
        }
    }

    pub fn selected_dark(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Variants { selected_dark, .. } => selected_dark,
        }
    }

    /// All four variant paths in storage order (light, dark, selected light,
    /// selected dark).
    pub fn paths(&self) -> [&str; 4] {
        [
            self.light(),
            self.dark(),
            self.selected_light(),
            self.selected_dark(),
        ]
    }
}

/// The typed view of a plugin manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginManifest {
    pub name: String,
    pub version: semver::Version,
    pub display_name: String,
    pub description: String,
    pub icon: Option<IconRefs>,
    /// Declared dependency names mapped to their raw version strings.
    pub dependencies: BTreeMap<String, String>,
    /// The complete original document, untouched.
    pub document: serde_json::Value,
}

// --- JSON intermediate structs ---

/// The fields lifted out of a manifest document. Everything else stays in the
/// retained [`serde_json::Value`].
#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    description: Option<String>,
    icon: Option<serde_json::Value>,
    dependencies: Option<serde_json::Value>,
}

/// The object form of the `icon` field.
#[derive(Debug, Deserialize)]
struct RawIconVariants {
    light: String,
    dark: String,
    selected: RawIconSelected,
}

#[derive(Debug, Deserialize)]
struct RawIconSelected {
    light: String,
    dark: String,
}

// --- Public API ---

impl PluginManifest {
    /// Lifts a manifest document into its typed view.
    ///
    /// Validates that `name`, `version`, `displayName`, and `description` are
    /// present and non-empty, that `version` cleans up to a valid semantic
    /// version, and that `icon` and `dependencies` have a recognized shape.
    pub fn from_document(document: serde_json::Value) -> Result<Self, ManifestError> {
        if !document.is_object() {
            return Err(ManifestError::NotAnObject);
        }
        let raw: RawManifest =
            serde_json::from_value(document.clone()).map_err(|_| ManifestError::NotAnObject)?;

        let name = required_field(raw.name, "name")?;
        let display_name = required_field(raw.display_name, "displayName")?;
        let description = required_field(raw.description, "description")?;
        let version_raw = required_field(raw.version, "version")?;
        let version = clean_version(&version_raw)?;

        let icon = match raw.icon {
            None => None,
            Some(value) => Some(parse_icon(value)?),
        };
        let dependencies = match raw.dependencies {
            None => BTreeMap::new(),
            Some(value) => parse_dependencies(value)?,
        };

        Ok(Self {
            name,
            version,
            display_name,
            description,
            icon,
            dependencies,
            document,
        })
    }
}

/// Strips the prefixes uploads commonly carry (whitespace, `=`, `v`) and
/// parses the remainder as a semantic version.
pub fn clean_version(raw: &str) -> Result<semver::Version, ManifestError> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_prefix('=').unwrap_or(cleaned).trim_start();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    semver::Version::parse(cleaned).map_err(|_| ManifestError::Version {
        given: raw.to_string(),
    })
}

fn required_field(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ManifestError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ManifestError::MissingField { field }),
    }
}

fn parse_icon(value: serde_json::Value) -> Result<IconRefs, ManifestError> {
    if let Some(path) = value.as_str() {
        if path.trim().is_empty() {
            return Err(ManifestError::IconShape);
        }
        return Ok(IconRefs::Single(path.to_string()));
    }
    let variants: RawIconVariants =
        serde_json::from_value(value).map_err(|_| ManifestError::IconShape)?;
    Ok(IconRefs::Variants {
        light: variants.light,
        dark: variants.dark,
        selected_light: variants.selected.light,
        selected_dark: variants.selected.dark,
    })
}

fn parse_dependencies(
    value: serde_json::Value,
) -> Result<BTreeMap<String, String>, ManifestError> {
    let serde_json::Value::Object(entries) = value else {
        return Err(ManifestError::DependencyShape);
    };
    let mut dependencies = BTreeMap::new();
    for (name, requirement) in entries {
        let Some(requirement) = requirement.as_str() else {
            return Err(ManifestError::DependencyShape);
        };
        dependencies.insert(name, requirement.to_string());
    }
    Ok(dependencies)
}
