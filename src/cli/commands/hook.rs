//! run install / run uninstall - Manage the pre-commit hook

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use crate::core::tools::ToolSet;
use crate::engine::Context;
use crate::hook::HookInstaller;
use crate::ui::output;

use super::{open_repo, require_tools};

/// Install a pre-commit hook that runs `tools`.
pub fn install(ctx: &Context, tools: ToolSet) -> Result<ExitCode> {
    let tools = require_tools(tools)?;
    let (_git, paths) = open_repo(ctx)?;
    let installer = HookInstaller::new(paths.hook_path());

    if installer.has_foreign_hook() {
        output::warn(
            format!(
                "Replacing existing pre-commit hook at {}",
                installer.hook_path().display()
            ),
            ctx.verbosity(),
        );
    }

    installer
        .install(&hook_program(), tools)
        .context("Failed to install pre-commit hook")?;

    output::print(
        format!(
            "The pre-commit hook was installed, running {}",
            tools.describe()
        ),
        ctx.verbosity(),
    );
    Ok(ExitCode::SUCCESS)
}

/// Clear the pre-commit hook.
pub fn uninstall(ctx: &Context) -> Result<ExitCode> {
    let (_git, paths) = open_repo(ctx)?;
    HookInstaller::new(paths.hook_path())
        .uninstall()
        .context("Failed to uninstall pre-commit hook")?;

    output::print("The pre-commit hook was uninstalled", ctx.verbosity());
    Ok(ExitCode::SUCCESS)
}

/// Command the hook should run: this executable, or `quality` from PATH.
fn hook_program() -> String {
    match std::env::current_exe() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(err) => {
            tracing::warn!(%err, "cannot locate own executable, hook will use PATH");
            "quality".to_string()
        }
    }
}
