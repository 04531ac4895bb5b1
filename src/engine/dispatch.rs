//! engine::dispatch
//!
//! Drives one pre-commit run.
//!
//! # State Machine
//!
//! ```text
//! Start -> ChangeCheck -> Empty: Done(success)
//!                      -> NonEmpty: Confirm -> Declined: Done(failure)
//!                                           -> Accepted: Invoke -> Aggregate -> Done
//! ```
//!
//! The state machine is linear. Tools run one at a time in registry order
//! and the run fails when the summed failure weight of all tools is
//! non-zero.

use std::io;

use thiserror::Error;

use crate::core::changes::ChangeSet;
use crate::core::tools::{OutputRule, ToolSet};
use crate::engine::invoker::{ToolInvoker, ToolResult, ToolStatus};
use crate::git::{ChangeSource, GitError};
use crate::ui::output::{format_list, Reporter};
use crate::ui::prompts::{PromptError, Prompter};

/// Message printed when every tool passed.
pub const COMPLETED_MESSAGE: &str = "Quality tools has completed";

/// Message printed once after tool diagnostics when any tool failed.
pub const FAILED_MESSAGE: &str = "There are some problems, please retry after fixing them";

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no quality tool enabled")]
    NoToolsEnabled,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Why a run stopped before invoking tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    /// The user answered anything but yes
    Answered,
    /// No terminal to ask on
    NotInteractive,
    /// Reading the answer failed
    PromptFailed(String),
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Nothing changed; no prompt, no tools
    NoChanges,
    /// The user did not consent; no tools ran
    Declined(DeclineReason),
    /// Every enabled tool was invoked
    Completed,
}

/// Aggregate of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Where the run ended
    pub state: RunState,
    /// Files the tools were (or would have been) run against
    pub changes: ChangeSet,
    /// One result per invoked tool, in invocation order
    pub results: Vec<ToolResult>,
    /// Sum of every result's failure weight
    pub failure_sum: u32,
}

impl RunOutcome {
    fn stopped(state: RunState, changes: ChangeSet) -> Self {
        Self {
            state,
            changes,
            results: Vec::new(),
            failure_sum: 0,
        }
    }

    /// Whether the commit may proceed.
    pub fn is_success(&self) -> bool {
        match self.state {
            RunState::NoChanges => true,
            RunState::Declined(_) => false,
            RunState::Completed => self.failure_sum == 0,
        }
    }

    /// Process exit code: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Runs the enabled tools against the changed files.
pub struct Dispatcher<'a> {
    source: &'a dyn ChangeSource,
    invoker: ToolInvoker<'a>,
    prompter: &'a mut dyn Prompter,
    assume_yes: bool,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher.
    pub fn new(
        source: &'a dyn ChangeSource,
        invoker: ToolInvoker<'a>,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            source,
            invoker,
            prompter,
            assume_yes: false,
        }
    }

    /// Treat the confirmation as already given.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Execute one run.
    ///
    /// # Errors
    ///
    /// Only environment failures abort: no tool enabled, a failed status
    /// query, or output that cannot be written. Tool failures are part of
    /// the returned [`RunOutcome`].
    pub fn run(&mut self, tools: ToolSet, out: &mut Reporter<'_>) -> Result<RunOutcome, DispatchError> {
        if tools.is_empty() {
            return Err(DispatchError::NoToolsEnabled);
        }

        let changes = self.source.changed_files()?;
        tracing::debug!(files = changes.len(), "collected changed files");
        if changes.is_empty() {
            tracing::info!("no changed files, nothing to check");
            return Ok(RunOutcome::stopped(RunState::NoChanges, changes));
        }

        if let Some(reason) = self.confirm(tools, &changes, out)? {
            return Ok(RunOutcome::stopped(RunState::Declined(reason), changes));
        }

        let mut results = Vec::new();
        let mut failure_sum: u32 = 0;
        for key in tools.keys() {
            let result = match self.invoker.prepare(key) {
                Ok(tool) => {
                    out.info(tool.spec().progress)?;
                    self.invoker.execute(&tool, &changes)
                }
                Err(result) => result,
            };
            report(&result, out)?;
            failure_sum = failure_sum.saturating_add(result.failure_weight());
            results.push(result);
        }

        if failure_sum > 0 {
            out.problem(FAILED_MESSAGE)?;
        } else {
            out.info(COMPLETED_MESSAGE)?;
        }

        Ok(RunOutcome {
            state: RunState::Completed,
            changes,
            results,
            failure_sum,
        })
    }

    /// Ask for consent. Returns the reason when the run must stop.
    fn confirm(
        &mut self,
        tools: ToolSet,
        changes: &ChangeSet,
        out: &mut Reporter<'_>,
    ) -> Result<Option<DeclineReason>, DispatchError> {
        let names = tools.describe();
        if self.assume_yes {
            tracing::debug!(tools = %names, "confirmation skipped");
            return Ok(None);
        }

        out.info("Changed files:")?;
        out.info(format_list(changes.paths(), "  - "))?;

        let question = format!("Do you want to use {} to fix these files?", names);
        let reason = match self.prompter.confirm(&question) {
            Ok(true) => return Ok(None),
            Ok(false) => {
                out.problem("Aborted: quality tools were not run")?;
                DeclineReason::Answered
            }
            Err(PromptError::NotInteractive) => {
                out.problem(format!(
                    "No interactive terminal attached; declining to run {}. Use --yes to skip the prompt.",
                    names
                ))?;
                DeclineReason::NotInteractive
            }
            Err(err) => {
                out.problem(format!("Could not read an answer ({}); declining", err))?;
                DeclineReason::PromptFailed(err.to_string())
            }
        };

        Ok(Some(reason))
    }
}

/// Print one tool's diagnostics.
fn report(result: &ToolResult, out: &mut Reporter<'_>) -> io::Result<()> {
    let spec = result.key.spec();
    let name = spec.display_name;

    match &result.status {
        ToolStatus::Passed => match spec.output_rule {
            OutputRule::ReportOnFailure => out.info("[OK] No errors"),
            OutputRule::RewriteOnOutput => out.info("[OK] No files needed fixing"),
        },
        ToolStatus::FilesRewritten => {
            for line in &result.output {
                out.verbatim(line)?;
            }
            out.problem(format!(
                "Some files have been fixed by {}, please re-commit these changes",
                name
            ))
        }
        ToolStatus::Failed => {
            for line in &result.output {
                out.verbatim(line)?;
            }
            out.problem(format!("{} exited with code {}", name, result.exit_code))
        }
        ToolStatus::NotInstalled { binary } => out.problem(format!(
            "The {} package is not installed in your project (expected {})",
            name,
            binary.display()
        )),
        ToolStatus::MissingConfig { candidates } => out.problem(format!(
            "The {} config file was not found in your project (looked for {})",
            name,
            candidates.join(", ")
        )),
        ToolStatus::TimedOut { after } => out.problem(format!(
            "{} timed out after {} seconds",
            name,
            after.as_secs()
        )),
        ToolStatus::SpawnFailed { message } => {
            out.problem(format!("Could not run {}: {}", name, message))
        }
    }
}
