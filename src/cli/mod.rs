//! Command-line interface for SAP.
//!
//! # Available Commands
//!
//! ## Publishing
//! - `source add` - add a package to the source file and publish it
//! - `source up` / `source update` - rebuild and republish a package
//! - `source rm` / `source remove` - withdraw packages
//! - `source push` - push existing packages to the server
//!
//! ## Consuming
//! - `save` - install packages into the project
//! - `remove` - uninstall packages from the project
//! - `list` - show packages installed on this machine
//!
//! # Basic Workflow
//!
//! ```bash
//! # Publisher: describe and publish a package
//! sap source add demo packages/demo -p "**.txt"
//!
//! # Consumer: install it
//! sap save demo
//! sap list
//! ```
//!
//! # Global Options
//!
//! Global options go before the subcommand (`sap -y save demo`), because
//! subcommands use `-v` for `--version`.
//!
//! - `-s, --server` - package server host, overrides `SAP_SERVER` and the
//!   config file
//! - `-y, --yes` - answer yes to every confirmation
//! - `-v, --verbose` / `-q, --quiet` - log level (`RUST_LOG` takes precedence)
//! - `--target-file` - target file used by `save`, `remove` and `list`

mod common;
mod list;
mod remove;
mod save;
mod source;

pub use common::{CommandContext, confirm_with};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{GlobalConfig, sap_dir};
use crate::constants::{SAP_SERVER_ENV, TARGET_FILE_NAME};

/// Main CLI structure for SAP.
#[derive(Parser)]
#[command(
    name = "sap",
    about = "SAP - publish and install file packages",
    version,
    long_about = "SAP packages selected files of a directory into versioned archives, \
                  publishes them to a package server and installs them into projects."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package server host
    #[arg(short, long, env = SAP_SERVER_ENV)]
    server: Option<String>,

    /// Answer yes to all confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Target file for `save`, `remove` and `list`
    #[arg(long, default_value = TARGET_FILE_NAME)]
    target_file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, update, remove or push source packages
    Source(source::SourceCommand),

    /// Install packages into the project
    Save(save::SaveCommand),

    /// Uninstall packages from the project
    Remove(remove::RemoveCommand),

    /// List installed packages
    List(list::ListCommand),
}

impl Cli {
    /// Default log filter selected by `--verbose` and `--quiet`.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Resolves the sap directory and configuration, then runs the command.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or the command fails
    pub fn execute(self) -> Result<()> {
        let sap_dir = sap_dir()?;
        let config = GlobalConfig::load(&sap_dir)?.with_server(self.server.clone());
        debug!("Using sap directory {} and server {}", sap_dir.display(), config.server);

        let ctx = CommandContext {
            sap_dir,
            config,
            assume_yes: self.yes,
            target_file: self.target_file,
        };
        self.command.execute(&ctx)
    }
}

impl Commands {
    fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Source(cmd) => cmd.execute(ctx),
            Self::Save(cmd) => cmd.execute(ctx),
            Self::Remove(cmd) => cmd.execute(ctx),
            Self::List(cmd) => cmd.execute(ctx),
        }
    }
}
