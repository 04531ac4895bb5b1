//! run command - Check changed files with the selected tools

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::tools::ToolSet;
use crate::engine::{Context, Dispatcher, SystemRunner, ToolInvoker, ToolSettings};
use crate::ui::output::Reporter;
use crate::ui::prompts::TerminalPrompter;

use super::{open_repo, require_tools};

/// Run the selected tools on the files changed in the working tree.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `tools` - Tools to run, in registry order
/// * `yes` - Skip the confirmation prompt
/// * `timeout` - Per-tool timeout in seconds, overriding config
pub fn run(ctx: &Context, tools: ToolSet, yes: bool, timeout: Option<u64>) -> Result<ExitCode> {
    let tools = require_tools(tools)?;
    let (git, paths) = open_repo(ctx)?;

    let config = Config::load(Some(&paths.common_dir)).context("Failed to load configuration")?;
    if let Some(path) = config.global_config_loaded_from() {
        tracing::debug!(path = %path.display(), "loaded global config");
    }
    if let Some(path) = config.repo_config_loaded_from() {
        tracing::debug!(path = %path.display(), "loaded repository config");
    }

    let settings =
        ToolSettings::from_config(&config).with_timeout(timeout.map(Duration::from_secs));
    let runner = SystemRunner;
    let invoker = ToolInvoker::new(&paths, &settings, &runner);

    // Config can turn prompting off but never on.
    let mut prompter = TerminalPrompter::new(ctx.interactive && config.interactive());
    let mut stdout = io::stdout();
    let mut reporter = Reporter::new(&mut stdout, ctx.verbosity());

    let mut dispatcher = Dispatcher::new(&git, invoker, &mut prompter).assume_yes(yes);
    let outcome = dispatcher.run(tools, &mut reporter)?;

    tracing::debug!(
        state = ?outcome.state,
        failure_sum = outcome.failure_sum,
        "run finished"
    );
    Ok(ExitCode::from(outcome.exit_code()))
}
