//! cli
//!
//! Command-line interface layer for quality.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! handlers in [`commands`], which wire the git, config, and engine layers
//! together and turn the run outcome into a process exit code.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::engine;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
    };
    tracing::debug!(?ctx, "starting");

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber.
///
/// `--debug` forces debug level for this crate; otherwise `RUST_LOG` is
/// honoured, defaulting to warnings only.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("quality_hook=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be set when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
