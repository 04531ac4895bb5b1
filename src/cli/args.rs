//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::tools::ToolSet;

/// Run code quality tools on changed files from a git pre-commit hook
#[derive(Parser, Debug)]
#[command(name = "quality")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if quality was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run quality tools on changed files, or manage the pre-commit hook
    #[command(
        name = "run",
        long_about = "Run quality tools on the files changed in the working tree.\n\n\
            Deleted files are skipped. When nothing changed the command succeeds \
            immediately. Otherwise it lists the changed files and asks before \
            running the selected tools, fixer first, then analyzer. Any tool \
            failure, rewritten file, or declined prompt fails the run.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Install a pre-commit hook running both tools
    quality run install --fixer --analyzer

    # Check the current changes by hand
    quality run --fixer --analyzer

    # Run without asking (CI or scripted use)
    quality run --analyzer --yes

    # Disable the hook again
    quality run uninstall

EXIT CODES:
    0   all tools passed, or nothing changed
    1   a tool failed, files were rewritten, or the prompt was declined
    2   not a git repository, bad configuration, or usage error"
    )]
    Run(RunArgs),

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash
    quality completion bash > ~/.local/share/bash-completion/completions/quality

    # Zsh
    quality completion zsh > ~/.zfunc/_quality

    # Fish
    quality completion fish > ~/.config/fish/completions/quality.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `quality run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub tools: ToolFlags,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Kill a tool that runs longer than this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub action: Option<HookAction>,
}

/// Tool selection flags.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ToolFlags {
    /// Run the style fixer (php-cs-fixer)
    #[arg(long, visible_alias = "php-cs-fixer")]
    pub fixer: bool,

    /// Run the static analyzer (phpstan)
    #[arg(long, visible_alias = "phpstan")]
    pub analyzer: bool,
}

impl ToolFlags {
    /// The selected tools.
    pub fn tool_set(&self) -> ToolSet {
        ToolSet::from_flags(self.fixer, self.analyzer)
    }
}

/// Hook management under `quality run`.
#[derive(Subcommand, Debug)]
pub enum HookAction {
    /// Install a pre-commit hook that runs the selected tools
    Install {
        #[command(flatten)]
        tools: ToolFlags,
    },

    /// Empty the pre-commit hook so commits are no longer checked
    Uninstall,
}

/// Supported shells for completion.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
