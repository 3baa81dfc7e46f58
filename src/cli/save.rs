//! Install packages into the current project.
//!
//! ```bash
//! # Latest release of demo into ./demo
//! sap save demo
//!
//! # Newest release at or above 1.2 into ./vendor/demo
//! sap save "demo>=1.2" --path vendor/demo
//!
//! # Reinstall everything listed in sap.json
//! sap save
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use super::common::CommandContext;
use crate::package::{PackageRecord, PackageSpec};
use crate::server::PackageServer;
use crate::target::{InstallPlan, Target};
use crate::version::{RequirementOp, VersionRequirement};

/// Install packages from the server and record them in the target file.
#[derive(Args)]
pub struct SaveCommand {
    /// Packages to install, e.g. `demo` or `demo>=1.2`; all packages in the
    /// target file when empty
    packages: Vec<String>,

    /// Directory to install into, relative to the target file (default: the
    /// package name)
    #[arg(short, long)]
    path: Option<String>,
}

impl SaveCommand {
    /// Installs the requested packages.
    ///
    /// # Errors
    /// Returns an error if a package cannot be resolved, fetched or installed
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut target = ctx.open_target()?;
        let server = ctx.server();

        // (spec, install dir) pairs
        let requests: Vec<(PackageSpec, Option<String>)> = if self.packages.is_empty() {
            let listed = target.packages().to_vec();
            if listed.is_empty() {
                warn!("No packages listed in {}", target.path().display());
            }
            listed.into_iter().map(pinned_spec).collect::<Result<_>>()?
        } else {
            self.packages
                .iter()
                .map(|spec| -> Result<(PackageSpec, Option<String>)> {
                    Ok((PackageSpec::parse(spec)?, self.path.clone()))
                })
                .collect::<Result<_>>()?
        };

        for (spec, path) in requests {
            save_package(ctx, &mut target, &server, &spec, path.as_deref())?;
        }
        Ok(())
    }
}

/// Pins a listed package to its recorded version and directory.
fn pinned_spec(record: PackageRecord) -> Result<(PackageSpec, Option<String>)> {
    let requirement = VersionRequirement::new(RequirementOp::Equal, &record.version)
        .with_context(|| format!("Invalid version recorded for {}", record.name))?;
    Ok((
        PackageSpec {
            name: record.name,
            requirement: Some(requirement),
        },
        Some(record.path),
    ))
}

fn save_package(
    ctx: &CommandContext,
    target: &mut Target,
    server: &dyn PackageServer,
    spec: &PackageSpec,
    path: Option<&str>,
) -> Result<()> {
    info!(
        "Saving {} ({})",
        spec.name,
        spec.requirement.as_ref().map_or_else(|| "latest".to_string(), ToString::to_string)
    );

    let version = server.resolve_version(&spec.name, spec.requirement.as_ref())?;
    let descriptor = server.fetch_descriptor(&spec.name, &version)?;

    if let InstallPlan::Downgrade { from } = target.plan(&descriptor)? {
        let message = format!(
            "are you sure you want to install an older ({}) version over a newer ({}) one?",
            descriptor.version, from
        );
        if !ctx.confirm(&message)? {
            println!("{} {}", "Skipped".yellow(), descriptor.name.bold());
            return Ok(());
        }
    }

    let record = target.install(&descriptor, path, server)?;
    println!(
        "{} {} ({}) to {}",
        "Saved".green(),
        record.name.bold(),
        record.version,
        record.path
    );
    Ok(())
}
