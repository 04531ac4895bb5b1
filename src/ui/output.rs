//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Informational output respects the quiet flag. Problems and tool
//! diagnostics are always shown. The [`Reporter`] writes to any
//! `io::Write` so the dispatcher can be driven against a buffer in tests.

use std::fmt::Display;
use std::io::{self, Write};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line-oriented writer for run output.
pub struct Reporter<'a> {
    out: &'a mut dyn Write,
    verbosity: Verbosity,
}

impl<'a> Reporter<'a> {
    /// Create a reporter over `out`.
    pub fn new(out: &'a mut dyn Write, verbosity: Verbosity) -> Self {
        Self { out, verbosity }
    }

    /// Informational line, suppressed in quiet mode.
    pub fn info(&mut self, message: impl Display) -> io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }
        writeln!(self.out, "{}", message)
    }

    /// Problem line, always shown.
    pub fn problem(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", message)
    }

    /// Raw tool output, always shown and never decorated.
    pub fn verbatim(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }
}
