//! Publish packages from a source file.
//!
//! # Examples
//!
//! ```bash
//! # Publish everything under packages/demo as demo 0.0.1
//! sap source add demo packages/demo
//!
//! # Only text files, explicit version, source file only
//! sap source add demo packages/demo -p "**.txt" -v 1.0.0 --local
//!
//! # Rebuild with the patch version bumped
//! sap source up demo
//!
//! # Withdraw a package
//! sap source rm demo
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::common::CommandContext;
use crate::constants::SOURCE_FILE_NAME;
use crate::core::SapError;
use crate::package::{PackageRecord, clean_package_name};
use crate::server::{PackageServer, RegistryServer};
use crate::source::{PackageRequest, SourceCollection};

/// Add, update, remove or push source packages.
#[derive(Args)]
pub struct SourceCommand {
    #[command(subcommand)]
    command: SourceSubcommand,
}

#[derive(Subcommand)]
enum SourceSubcommand {
    /// Add a package to the source file and the server
    Add(PublishArgs),

    /// Rebuild a package, bumping its patch version unless one is given
    #[command(alias = "update")]
    Up(UpdateArgs),

    /// Remove packages from the source file and the server
    #[command(alias = "remove")]
    Rm(RemoveArgs),

    /// Push packages from the source file to the server
    Push(PushArgs),
}

/// Options shared by `add` and `up`.
#[derive(Args)]
struct PackageOptions {
    /// Glob pattern for files inside PATH, repeatable (default "**")
    #[arg(short = 'p', long = "pattern")]
    patterns: Vec<String>,

    /// Update the source file only, do not push to the server
    #[arg(short, long)]
    local: bool,

    /// Package version (default 0.0.1 for new packages)
    #[arg(short, long)]
    version: Option<String>,

    /// Source file location
    #[arg(short, long, default_value = SOURCE_FILE_NAME)]
    file: PathBuf,
}

#[derive(Args)]
struct PublishArgs {
    /// Package name
    package: String,

    /// Package directory, relative to the source file
    path: String,

    #[command(flatten)]
    options: PackageOptions,
}

#[derive(Args)]
struct UpdateArgs {
    /// Package name
    package: String,

    /// New package directory, relative to the source file
    path: Option<String>,

    #[command(flatten)]
    options: PackageOptions,
}

#[derive(Args)]
struct RemoveArgs {
    /// Packages to remove, all packages when empty
    packages: Vec<String>,

    /// Remove from the source file only, leave the server untouched
    #[arg(short, long)]
    local: bool,

    /// Source file location
    #[arg(short, long, default_value = SOURCE_FILE_NAME)]
    file: PathBuf,
}

#[derive(Args)]
struct PushArgs {
    /// Packages to push, all packages when empty
    packages: Vec<String>,

    /// Source file location
    #[arg(short, long, default_value = SOURCE_FILE_NAME)]
    file: PathBuf,
}

impl SourceCommand {
    /// Runs the selected source subcommand.
    ///
    /// # Errors
    /// Returns an error if the source file cannot be opened or the operation fails
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.command {
            SourceSubcommand::Add(args) => {
                let request = PackageRequest::new(&args.package)
                    .with_path(args.path)
                    .with_patterns(args.options.patterns.clone())
                    .with_version(args.options.version.clone());
                add(ctx, &args.options, &request)
            }
            SourceSubcommand::Up(args) => {
                let mut request = PackageRequest::new(&args.package)
                    .with_patterns(args.options.patterns.clone())
                    .with_version(args.options.version.clone());
                request.path = args.path;
                let Some(mut source) = open_source(ctx, &args.options.file)? else {
                    return Ok(());
                };
                update(ctx, &mut source, &args.options, &request)
            }
            SourceSubcommand::Rm(args) => remove(ctx, &args),
            SourceSubcommand::Push(args) => push(ctx, &args),
        }
    }
}

/// Opens the source file, offering to create it when missing.
///
/// Returns `None` when the user declines.
fn open_source(ctx: &CommandContext, file: &Path) -> Result<Option<SourceCollection>> {
    if file.exists() {
        return SourceCollection::load(file).map(Some);
    }

    let message = format!("source file ({}) does not exist, create it?", file.display());
    if !ctx.confirm(&message)? {
        println!("{}", "Cancelled.".yellow());
        return Ok(None);
    }
    SourceCollection::create(file).map(Some)
}

fn add(ctx: &CommandContext, options: &PackageOptions, request: &PackageRequest) -> Result<()> {
    let Some(mut source) = open_source(ctx, &options.file)? else {
        return Ok(());
    };

    if source.get(&request.name).is_some() {
        let message = format!("package ({}) already exists, overwrite?", request.name);
        if !ctx.confirm(&message)? {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
        return update(ctx, &mut source, options, request);
    }

    let server = ctx.server();
    let record = source.add(request, publish_target(&server, options.local))?;
    report("Added", &record, options.local);
    Ok(())
}

fn update(
    ctx: &CommandContext,
    source: &mut SourceCollection,
    options: &PackageOptions,
    request: &PackageRequest,
) -> Result<()> {
    let server = ctx.server();
    match source.update(request, publish_target(&server, options.local)) {
        Ok(record) => {
            report("Updated", &record, options.local);
            Ok(())
        }
        Err(e) => match e.downcast_ref::<SapError>() {
            Some(SapError::PackageNotFound { .. }) => Err(e.context(format!(
                "Package {} is not in {}, did you mean 'sap source add'?",
                request.name,
                source.path().display()
            ))),
            _ => Err(e),
        },
    }
}

fn remove(ctx: &CommandContext, args: &RemoveArgs) -> Result<()> {
    let mut source = SourceCollection::load(&args.file)?;

    let names = if args.packages.is_empty() {
        if !ctx.confirm("remove all packages?")? {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
        source.package_names()
    } else {
        args.packages.iter().map(String::as_str).map(clean_package_name).collect()
    };

    let server = ctx.server();
    for name in names {
        if source.remove(&name)?.is_none() {
            return Err(SapError::PackageNotFound {
                name,
            }
            .into());
        }
        if !args.local {
            server.remove(&name)?;
        }
        println!("{} {}", "Removed".green(), name.bold());
    }
    Ok(())
}

fn push(ctx: &CommandContext, args: &PushArgs) -> Result<()> {
    let source = SourceCollection::load(&args.file)?;
    let server = ctx.server();

    let names =
        if args.packages.is_empty() { source.package_names() } else { args.packages.clone() };
    if names.is_empty() {
        warn!("No packages in {}", source.path().display());
    }

    for name in names {
        source.push(&name, &server)?;
        println!("{} {} to {}", "Pushed".green(), clean_package_name(&name).bold(), server.address());
    }
    Ok(())
}

fn publish_target(server: &RegistryServer, local: bool) -> Option<&dyn PackageServer> {
    if local { None } else { Some(server) }
}

fn report(action: &str, record: &PackageRecord, local: bool) {
    println!(
        "{} {} ({}) with {} file(s){}",
        action.green(),
        record.name.bold(),
        record.version,
        record.files.len(),
        if local { " [local]" } else { "" }
    );
}
