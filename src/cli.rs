//! Command-line interface definitions.
//!
//! Three entry points into the orchestrator; running without a subcommand
//! is the same as `dev`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Static-site asset pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to the root
    #[arg(short = 'C', long, default_value = "assetsmith.toml", global = true)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Development build into the dev output, then serve, watch and live reload.
    ///
    /// The browser is not opened; visit the printed address.
    Dev,

    /// Production build: minified, cache-busted, into the release output
    Build,

    /// Delete both output directories
    Clean,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Dev)
    }
}
