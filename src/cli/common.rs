//! Common utilities for CLI commands

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::GlobalConfig;
use crate::server::RegistryServer;
use crate::target::Target;

/// Settings shared by every command, resolved once from the global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Per-user sap directory (`~/.sap` or `$SAP_HOME`)
    pub sap_dir: PathBuf,
    /// Loaded global configuration with the `--server` override applied
    pub config: GlobalConfig,
    /// Answer yes to every confirmation prompt
    pub assume_yes: bool,
    /// Target file used by `save`, `remove` and `list`
    pub target_file: PathBuf,
}

impl CommandContext {
    /// The package server described by the configuration.
    #[must_use]
    pub fn server(&self) -> RegistryServer {
        RegistryServer::new(
            self.config.server.clone(),
            self.config.port,
            self.config.registry_dir(&self.sap_dir),
        )
    }

    /// Opens the target file with this context's sap directory.
    ///
    /// # Errors
    /// Returns an error if the target file or manifest cannot be opened
    pub fn open_target(&self) -> Result<Target> {
        Target::open(&self.target_file, &self.sap_dir)
            .with_context(|| format!("Failed to open target file: {}", self.target_file.display()))
    }

    /// Asks a yes/no question on stdin unless `--yes` was given.
    ///
    /// # Errors
    /// Returns an error if stdin or stdout fail
    pub fn confirm(&self, message: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        confirm_with(message, &mut io::stdin().lock(), &mut io::stdout())
    }
}

/// Prints `message [Y/n] (n) ` and reads one answer line.
///
/// Only `y` and `yes` (any case) accept; an empty answer or end of input
/// takes the default, no.
///
/// # Errors
/// Returns an error if writing the prompt or reading the answer fails
pub fn confirm_with<R: BufRead, W: Write>(message: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{message} [Y/n] (n) ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read answer")?;
    let answer = answer.trim().to_lowercase();

    Ok(matches!(answer.as_str(), "y" | "yes"))
}
