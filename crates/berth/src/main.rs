// SPDX-FileCopyrightText: 2026 Berth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Berth - a plugin package registry.
//!
//! This is the binary entry point for the Berth registry tooling.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod inspect;

/// Berth - a plugin package registry.
#[derive(Parser, Debug)]
#[command(name = "berth", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the upload validation pipeline on a local archive and print the
    /// resulting descriptor.
    Inspect {
        /// Path of the tar archive to validate.
        archive: PathBuf,
    },
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let config = match berth_config::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("berth: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.registry.log_level);

    let exit = match Cli::parse().command {
        Some(Commands::Inspect { archive }) => inspect::run(&archive).await,
        Some(Commands::Config) => {
            println!("registry.log_level = {}", config.registry.log_level);
            println!("storage.database_path = {}", config.storage.database_path);
            println!("blobs.root = {}", config.blobs.root);
            0
        }
        None => {
            println!("berth: use --help for available commands");
            0
        }
    };
    std::process::exit(exit);
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("berth={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
