//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

/// Keep ownership and permission bits of directory trees in line with a policy
#[derive(Parser, Debug)]
#[command(name = "enforced")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (.yaml, .yml, .toml or .json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to the system log instead of stderr
    #[arg(long)]
    pub syslog: bool,
}

impl Cli {
    /// Maximum level to log at.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::ERROR,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}
