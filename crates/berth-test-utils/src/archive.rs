// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory tar archive fixtures for ingestion tests.

use serde_json::json;

/// A syntactically valid SVG icon.
pub const SVG_ICON: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><circle cx="8" cy="8" r="6"/></svg>"#;

/// A second valid SVG with different bytes, for distinct content hashes.
pub const SVG_ICON_ALT: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><rect width="12" height="12"/></svg>"#;

/// A small but realistic entry module.
pub const ENTRY_JS: &str = r#"import { h } from "./assets/runtime.js";
// mount point wired up by the host shell
export function start(root) {
    const state = { clicks: 0 };
    return h(root, `started ${state.clicks}`);
}
"#;

/// Builds the entry document shell referencing the plugin's own script URL.
pub fn entry_html(name: &str, version: &str, script_path: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<script type=\"module\" \
         src=\"https://plugins.berth.dev/{name}/{version}/{script_path}\"></script>\n\
         </head>\n<body><div id=\"root\"></div></body>\n</html>\n"
    )
}

/// Builds a manifest document with a single icon and the given dependencies.
pub fn manifest_document(
    name: &str,
    version: &str,
    dependencies: &[(&str, &str)],
) -> serde_json::Value {
    let deps: serde_json::Map<String, serde_json::Value> = dependencies
        .iter()
        .map(|(dep, req)| (dep.to_string(), json!(req)))
        .collect();
    json!({
        "name": name,
        "version": version,
        "displayName": name,
        "description": format!("{name} test fixture"),
        "icon": "icon.svg",
        "dependencies": deps,
    })
}

/// Incrementally builds a tar archive in memory.
pub struct ArchiveFixture {
    builder: tar::Builder<Vec<u8>>,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// A complete, valid package archive for the given identity: manifest,
    /// icon, entry document, entry script, and one static asset.
    pub fn complete_package(name: &str, version: &str) -> Self {
        Self::package_with_dependencies(name, version, &[])
    }

    /// As [`Self::complete_package`], with declared manifest dependencies.
    pub fn package_with_dependencies(
        name: &str,
        version: &str,
        dependencies: &[(&str, &str)],
    ) -> Self {
        Self::new()
            .manifest(&manifest_document(name, version, dependencies))
            .text("icon.svg", SVG_ICON)
            .text("index.html", &entry_html(name, version, "main.js"))
            .text("main.js", ENTRY_JS)
            .text("assets/runtime.js", "export function h(el, text) { el.textContent = text; }")
    }

    pub fn manifest(self, document: &serde_json::Value) -> Self {
        let body = serde_json::to_vec_pretty(document).expect("fixture manifest serializes");
        self.bytes("manifest.json", &body)
    }

    pub fn text(self, path: &str, content: &str) -> Self {
        self.bytes(path, content.as_bytes())
    }

    pub fn bytes(mut self, path: &str, content: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, content)
            .expect("fixture entry appends");
        self
    }

    /// Finishes the archive and returns its raw bytes.
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().expect("fixture archive finishes")
    }
}

impl Default for ArchiveFixture {
    fn default() -> Self {
        Self::new()
    }
}
