//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode a
//! confirmation returns [`PromptError::NotInteractive`] instead of
//! blocking on a read that may never complete; callers treat that as a
//! decline.
//!
//! The [`Prompter`] trait separates the question from the terminal so the
//! dispatcher can be driven by [`ScriptedPrompter`] in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Something that can ask the user a yes/no question.
pub trait Prompter {
    /// Ask `question`. `Ok(true)` only for an affirmative answer.
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError>;
}

/// Whether an answer counts as consent.
///
/// Only `y` and `yes` (any case, surrounding whitespace ignored) do.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    /// Create a prompter. With `interactive == false` every question
    /// fails with [`PromptError::NotInteractive`].
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }

        let mut stdout = io::stdout();
        write!(stdout, "{} [y/N] ", question)?;
        stdout.flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            // EOF
            writeln!(stdout)?;
            return Ok(false);
        }

        Ok(is_affirmative(&input))
    }
}

/// Answers questions from a fixed script.
///
/// Each question consumes the next scripted answer. Running out of
/// answers behaves like a non-interactive terminal.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Prompter that answers with each given text in turn.
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompter that answers "y" once.
    pub fn accepting() -> Self {
        Self::new(["y"])
    }

    /// Prompter that answers "n" once.
    pub fn declining() -> Self {
        Self::new(["n"])
    }

    /// Prompter with no terminal attached.
    pub fn non_interactive() -> Self {
        Self::default()
    }

    /// Questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        self.asked.push(question.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(is_affirmative(&answer)),
            None => Err(PromptError::NotInteractive),
        }
    }
}
