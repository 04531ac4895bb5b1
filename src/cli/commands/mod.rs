//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler validates its arguments, opens the repository, and hands
//! off to the engine or the hook installer. Handlers return the process
//! exit code; errors bubble up as `anyhow` and become exit code 2 in
//! `main`.

mod completion;
mod hook;
mod run;

pub use completion::completion;
pub use hook::{install, uninstall};
pub use run::run;

use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};

use crate::cli::args::{Command, HookAction, RunArgs};
use crate::core::paths::RepoPaths;
use crate::core::tools::ToolSet;
use crate::engine::Context;
use crate::git::Git;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Run(RunArgs {
            tools,
            yes,
            timeout,
            action,
        }) => match action {
            None => run(ctx, tools.tool_set(), yes, timeout),
            // Flags given before `install` count too: `run --fixer install`.
            Some(HookAction::Install { tools: extra }) => {
                install(ctx, tools.tool_set().union(extra.tool_set()))
            }
            Some(HookAction::Uninstall) => uninstall(ctx),
        },
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Reject an empty tool selection with a usage hint.
fn require_tools(tools: ToolSet) -> Result<ToolSet> {
    if tools.is_empty() {
        bail!("No quality tool selected. Pass --fixer and/or --analyzer.");
    }
    Ok(tools)
}

/// Open the repository around the working directory.
fn open_repo(ctx: &Context) -> Result<(Git, RepoPaths)> {
    let cwd = ctx.work_dir()?;
    let git = Git::open(&cwd).context("Failed to open git repository")?;
    let paths = git.paths().context("Failed to resolve repository paths")?;
    Ok((git, paths))
}
