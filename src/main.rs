//! SAP command-line entry point
//!
//! Available commands:
//! - `source add|up|rm|push` - publish packages from a source file
//! - `save` - install packages into the project
//! - `remove` - uninstall packages
//! - `list` - list installed packages

use clap::Parser;
use sap_cli::cli::Cli;
use sap_cli::core::user_friendly_error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    init_tracing(&cli);

    if let Err(e) = cli.execute() {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level chosen by the flags.
fn init_tracing(cli: &Cli) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
