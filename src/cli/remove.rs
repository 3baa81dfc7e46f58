//! Uninstall packages from the current project.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::package::clean_package_name;

/// Delete installed package files and drop the packages from the target file.
#[derive(Args)]
pub struct RemoveCommand {
    /// Packages to uninstall
    #[arg(required = true)]
    packages: Vec<String>,
}

impl RemoveCommand {
    /// Uninstalls each named package. Unknown names are reported and skipped.
    ///
    /// # Errors
    /// Returns an error if the target file cannot be opened or files cannot be deleted
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut target = ctx.open_target()?;

        for name in &self.packages {
            match target.uninstall(name)? {
                Some(record) => println!("{} {}", "Removed".green(), record.name.bold()),
                None => println!(
                    "{} {} is not installed",
                    "Warning:".yellow(),
                    clean_package_name(name)
                ),
            }
        }
        Ok(())
    }
}
