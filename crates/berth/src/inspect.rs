// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `berth inspect` command implementation.
//!
//! Runs the full upload validation pipeline against a local archive, without
//! touching the database or blob store, and prints what the registry would
//! see. Useful for plugin authors checking a package before uploading it.

use std::path::Path;

use berth_ingest::ArchiveIngestor;
use tracing::debug;

/// Validates the archive at `path` and prints the descriptor summary.
/// Returns the process exit code.
pub async fn run(path: &Path) -> i32 {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            eprintln!("berth inspect: cannot open {}: {e}", path.display());
            return 1;
        }
    };

    match ArchiveIngestor::new().begin(file).await {
        Ok(descriptor) => {
            debug!(upload = %descriptor.upload_id, "inspection upload id");
            println!("{} {}", descriptor.name, descriptor.version);
            println!("  display name: {}", descriptor.display_name);
            println!("  description:  {}", descriptor.description);
            println!("  entry script: {}", descriptor.entry_script.path);
            println!(
                "  icons:        {} {} {} {}",
                short_hash(&descriptor.icons.light.hash),
                short_hash(&descriptor.icons.dark.hash),
                short_hash(&descriptor.icons.selected_light.hash),
                short_hash(&descriptor.icons.selected_dark.hash),
            );
            if descriptor.manifest.dependencies.is_empty() {
                println!("  dependencies: none");
            } else {
                println!("  dependencies:");
                for (name, version) in &descriptor.manifest.dependencies {
                    println!("    {name} {version}");
                }
            }
            println!("  static assets: {}", descriptor.static_assets.len());
            for path in descriptor.static_assets.keys() {
                println!("    {path}");
            }
            0
        }
        Err(e) => {
            eprintln!("berth inspect: archive rejected: {e}");
            1
        }
    }
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
