// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry stage: validate `index.html`, locate the compiled entry script
//! through the plugin URL pattern, and collect the surviving static assets.

use berth_core::FileContent;
use regex::Regex;
use tracing::debug;

use crate::archive::EntryTable;
use crate::error::IngestError;

pub(crate) const ENTRY_DOCUMENT_PATH: &str = "index.html";

/// Base of the published plugin URL embedded in entry documents.
pub const PLUGIN_URL_BASE: &str = "https://plugins.berth.dev";

/// Prefix under which archive entries count as static assets.
pub(crate) const ASSETS_PREFIX: &str = "assets/";

/// The compiled entry script referenced by the entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryScript {
    /// Path of the script inside the archive, as referenced by the URL.
    pub path: String,
    pub source: String,
}

/// Consumes `index.html` and the script it references.
pub(crate) fn take_entry(
    name: &str,
    version: &semver::Version,
    entries: &mut EntryTable,
) -> Result<(String, EntryScript), IngestError> {
    let bytes = entries
        .remove(ENTRY_DOCUMENT_PATH)
        .ok_or(IngestError::EntryDocumentMissing)?;
    let document =
        String::from_utf8(bytes).map_err(|_| IngestError::EntryDocumentInvalid {
            reason: "not UTF-8".to_string(),
        })?;
    validate_html(&document)?;

    let script_path = locate_script_path(&document, name, version).ok_or_else(|| {
        IngestError::EntryScriptUnreferenced {
            name: name.to_string(),
            version: version.to_string(),
        }
    })?;
    let script_bytes =
        entries
            .remove(&script_path)
            .ok_or_else(|| IngestError::EntryScriptNotFound {
                path: script_path.clone(),
            })?;
    let source =
        String::from_utf8(script_bytes).map_err(|_| IngestError::EntryScriptInvalid {
            path: script_path.clone(),
            reason: "not UTF-8".to_string(),
        })?;
    validate_module_syntax(&source).map_err(|reason| IngestError::EntryScriptInvalid {
        path: script_path.clone(),
        reason,
    })?;

    debug!(script = %script_path, "entry document and script validated");
    Ok((document, EntryScript { path: script_path, source }))
}

/// Drains the remaining table: entries under `assets/` are retained with
/// text-like extensions decoded as text, everything else is discarded.
pub(crate) fn collect_assets(entries: EntryTable) -> std::collections::BTreeMap<String, FileContent> {
    let mut assets = std::collections::BTreeMap::new();
    for (path, bytes) in entries {
        if !path.starts_with(ASSETS_PREFIX) {
            continue;
        }
        let content = if is_text_path(&path) {
            match String::from_utf8(bytes) {
                Ok(text) => FileContent::Text(text),
                Err(e) => FileContent::Bytes(e.into_bytes()),
            }
        } else {
            FileContent::Bytes(bytes)
        };
        assets.insert(path, content);
    }
    assets
}

/// A light structural check: the document must carry `<html>` markup. The
/// entry shell is generated tooling output, not arbitrary authored HTML, so
/// anything that fails this is a broken build.
fn validate_html(document: &str) -> Result<(), IngestError> {
    let lower = document.to_lowercase();
    let opens_html = lower.trim_start().starts_with("<!doctype html")
        || lower.contains("<html");
    if !opens_html || !lower.contains("</html>") {
        return Err(IngestError::EntryDocumentInvalid {
            reason: "no <html> document structure found".to_string(),
        });
    }
    Ok(())
}

/// Finds the plugin's own script URL inside the entry document and returns
/// the script path relative to the archive root.
fn locate_script_path(
    document: &str,
    name: &str,
    version: &semver::Version,
) -> Option<String> {
    let pattern = format!(
        r#"{}/{}/{}/([A-Za-z0-9][A-Za-z0-9._/-]*\.m?js)"#,
        regex::escape(PLUGIN_URL_BASE),
        regex::escape(name),
        regex::escape(&version.to_string()),
    );
    // The pattern is built from an escaped constant base plus escaped
    // manifest fields, so compilation cannot fail.
    let re = Regex::new(&pattern).ok()?;
    re.captures(document)
        .map(|captures| captures[1].to_string())
}

/// Bounded module-shape validation: UTF-8 is already guaranteed by the
/// caller; here the source must be non-empty, free of NUL bytes, and have
/// balanced delimiters with terminated strings and comments. String,
/// template-literal, and comment interiors are skipped so their brackets do
/// not count.
fn validate_module_syntax(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("script is empty".to_string());
    }
    if source.contains('\0') {
        return Err("script contains NUL bytes".to_string());
    }

    let mut stack = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return Err(format!("unbalanced `{c}`"));
                }
            }
            '\'' | '"' => skip_string(&mut chars, c)?,
            '`' => skip_template(&mut chars)?,
            '/' => match chars.peek() {
                Some('/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        if c == '*' && chars.peek() == Some(&'/') {
                            chars.next();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err("unterminated block comment".to_string());
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    if let Some(open) = stack.pop() {
        return Err(format!("unclosed `{open}`"));
    }
    Ok(())
}

fn skip_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> Result<(), String> {
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => return Err("unterminated string literal".to_string()),
            c if c == quote => return Ok(()),
            _ => {}
        }
    }
    Err("unterminated string literal".to_string())
}

fn skip_template(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<(), String> {
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '`' => return Ok(()),
            '$' if chars.peek() == Some(&'{') => {
                // `${ ... }` interpolation hole: balance braces inside it.
                chars.next();
                let mut depth = 1usize;
                for c in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                if depth != 0 {
                    return Err("unterminated template interpolation".to_string());
                }
            }
            _ => {}
        }
    }
    Err("unterminated template literal".to_string())
}

/// Whether the path's extension is treated as text when decoding assets.
fn is_text_path(path: &str) -> bool {
    let Some((_, extension)) = path.rsplit_once('.') else {
        return false;
    };
    matches!(
        extension.to_ascii_lowercase().as_str(),
        "js" | "mjs" | "css" | "html" | "htm" | "json" | "svg" | "txt" | "md" | "map" | "xml"
    )
}
