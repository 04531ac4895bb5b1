//! quality - Run code quality tools from a git pre-commit hook
//!
//! quality finds the files changed in the working tree, asks before
//! touching them, and runs a style fixer and a static analyzer from the
//! project's `vendor/bin`. Any tool failure, rewritten file, or declined
//! prompt makes the run fail so the commit is stopped.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`engine`] - Orchestrates ChangeCheck → Confirm → Invoke → Aggregate
//! - [`core`] - Change detection, tool registry, config, and paths
//! - [`git`] - Single interface for all Git queries
//! - [`hook`] - Installs and clears the pre-commit hook
//! - [`ui`] - Output and prompting
//!
//! # Correctness Invariants
//!
//! 1. Deleted files are never passed to a tool
//! 2. No tool runs without consent
//! 3. A non-zero tool exit code always fails the run
//! 4. File paths reach tools as separate arguments, never through a shell

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod hook;
pub mod ui;
