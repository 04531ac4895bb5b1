//! engine
//!
//! Orchestrates a pre-commit run: ChangeCheck -> Confirm -> Invoke -> Aggregate.
//!
//! # Architecture
//!
//! - [`invoker`] - Runs a single tool: precondition checks, subprocess,
//!   output interpretation
//! - [`dispatch`] - Owns the run state machine and the aggregate result
//!
//! # Invariants
//!
//! - No tool runs without consent (an answer or `--yes`)
//! - Tools run sequentially in registry order
//! - Tool failures are values; only environment failures are errors
//!
//! # Example
//!
//! ```ignore
//! use quality_hook::engine::{Dispatcher, SystemRunner, ToolInvoker, ToolSettings};
//!
//! let invoker = ToolInvoker::new(&paths, &settings, &SystemRunner);
//! let outcome = Dispatcher::new(&git, invoker, &mut prompter).run(tools, &mut reporter)?;
//! std::process::exit(outcome.exit_code().into());
//! ```

pub mod dispatch;
pub mod invoker;

pub use dispatch::{DeclineReason, DispatchError, Dispatcher, RunOutcome, RunState};
pub use invoker::{
    InvokeError, PreparedTool, ProcessOutput, ProcessRunner, SystemRunner, ToolInvoker,
    ToolResult, ToolSettings, ToolStatus,
};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// Directory commands operate from.
    pub fn work_dir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
