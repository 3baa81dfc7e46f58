//! List packages installed on this machine.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandContext;
use crate::manifest::Manifest;
use crate::package::PackageRecord;

/// Show the packages recorded in the installed manifest.
#[derive(Args)]
pub struct ListCommand {
    /// Print the manifest records as JSON
    #[arg(long)]
    json: bool,
}

impl ListCommand {
    /// Prints the installed packages.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be opened
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let manifest = Manifest::open(&crate::config::manifest_path(&ctx.sap_dir))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(manifest.packages())?);
        } else {
            output_table(manifest.packages());
        }
        Ok(())
    }
}

fn output_table(packages: &[PackageRecord]) {
    if packages.is_empty() {
        println!("No installed packages found.");
        return;
    }

    println!(
        "{:<32} {:<12} {:<8} {}",
        "Name".cyan().bold(),
        "Version".cyan().bold(),
        "Files".cyan().bold(),
        "Path".cyan().bold()
    );
    println!("{}", "-".repeat(72).bright_black());

    for package in packages {
        println!(
            "{:<32} {:<12} {:<8} {}",
            package.name,
            package.version,
            package.files.len(),
            package.path
        );
    }

    println!();
    println!("{}: {} package(s)", "Total".green().bold(), packages.len());
}
