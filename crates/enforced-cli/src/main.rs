//! enforced
//!
//! Daemon that walks and watches the folders named in its configuration and
//! corrects ownership and permission bits as files appear or drift.

mod cli;
mod error;
mod logging;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use enforced_core::{EnforceOptions, Enforcer, accessible_folders};
use enforced_fs::SystemAttributes;
use enforced_policy::{EnforcerConfig, SystemIds, TreeBuilder};

use cli::Cli;
use error::{CliError, Result};

fn main() {
    let cli = Cli::parse();
    let syslog = cli.syslog;

    if let Err(e) = run(cli) {
        if syslog {
            tracing::error!("{e}");
        }
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level(), cli.syslog)?;

    let config_path = cli
        .config
        .ok_or_else(|| CliError::user("No configuration file given; pass --config <PATH>"))?;

    tracing::info!(path = %config_path.display(), "Config path");
    if cli.dry_run {
        tracing::info!("Dry run enabled");
    }

    let config = EnforcerConfig::load(&config_path)?;
    let tree = TreeBuilder::new(&SystemIds).build(&config.folders)?;
    tracing::debug!("Policy tree:\n{tree}");

    let base_folders = tree.require_base_folders()?;
    let folders = accessible_folders(&base_folders);
    if folders.is_empty() {
        tracing::warn!("None of the configured folders is accessible; waiting for nothing");
    }

    // Held for the life of the process; the loop only ends on error.
    let (_shutdown, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
    let options = EnforceOptions {
        dry_run: cli.dry_run,
        ..EnforceOptions::default()
    };
    Enforcer::new(Arc::new(tree), SystemAttributes, options).run(&folders, shutdown_rx)?;

    Ok(())
}
