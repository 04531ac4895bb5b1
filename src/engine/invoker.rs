//! engine::invoker
//!
//! Runs one external quality tool against a change set.
//!
//! # Lifecycle
//!
//! ```text
//! prepare (binary present? config present?) -> execute (spawn, capture) -> interpret
//! ```
//!
//! Precondition failures never spawn a process. A non-zero exit code is an
//! ordinary [`ToolResult`], not an error.
//!
//! # Process Execution
//!
//! Tools are spawned through the [`ProcessRunner`] trait with an explicit
//! argv: every changed path is its own argument and nothing is interpreted
//! by a shell. [`SystemRunner`] captures stdout line by line and leaves
//! stderr attached to the terminal.

use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::changes::ChangeSet;
use crate::core::config::{Config, DEFAULT_BIN_DIR, DEFAULT_MEMORY_LIMIT};
use crate::core::paths::RepoPaths;
use crate::core::tools::{ArgTemplate, OutputRule, ToolKey, ToolSpec};

/// Separates tool options from the changed paths, so a file named like an
/// option (`--memory-limit=1M`) is still read as a path.
const END_OF_OPTIONS: &str = "--";

/// How often a process with a deadline is polled.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors from running a subprocess.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: PathBuf,
        source: io::Error,
    },

    #[error("'{program}' timed out after {}s", .after.as_secs())]
    TimedOut { program: PathBuf, after: Duration },

    #[error("failed while waiting for '{program}': {source}")]
    Wait {
        program: PathBuf,
        source: io::Error,
    },
}

/// Exit code and captured stdout of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (1 when the process was killed by a signal)
    pub exit_code: i32,
    /// Stdout split into lines, trailing newline characters removed
    pub stdout: Vec<String>,
}

/// Spawns a program and waits for it.
pub trait ProcessRunner {
    /// Run `program` with `args` in `cwd`, killing it after `timeout`.
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, InvokeError>;
}

/// Runs real processes with `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: &Path,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, InvokeError> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let stdout = child.stdout.take();
        let reader = thread::spawn(move || match stdout {
            Some(pipe) => read_lines(pipe),
            None => Ok(Vec::new()),
        });

        let wait_error = |source| InvokeError::Wait {
            program: program.to_path_buf(),
            source,
        };

        let status = match timeout {
            Some(limit) => match wait_with_deadline(&mut child, limit).map_err(wait_error)? {
                Some(status) => status,
                None => {
                    // The reader thread is left to finish once the pipe closes.
                    return Err(InvokeError::TimedOut {
                        program: program.to_path_buf(),
                        after: limit,
                    });
                }
            },
            None => child.wait().map_err(wait_error)?,
        };

        let stdout = reader
            .join()
            .unwrap_or_else(|_| Ok(Vec::new()))
            .map_err(wait_error)?;

        Ok(ProcessOutput {
            exit_code: status.code().unwrap_or(1),
            stdout,
        })
    }
}

/// Wait for `child`, killing it once `limit` has passed.
///
/// Returns `Ok(None)` when the deadline was hit. Only the direct child is
/// killed: processes it spawned outlive the run and can keep the stdout pipe,
/// and with it the detached reader thread, open.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= limit {
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Split a stream into lines, decoding lossily.
fn read_lines(stream: impl Read) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    for chunk in BufReader::new(stream).split(b'\n') {
        let chunk = chunk?;
        let line = String::from_utf8_lossy(&chunk);
        lines.push(line.trim_end_matches('\r').to_string());
    }
    Ok(lines)
}

/// Settings that shape how tools are located and invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    /// Directory with tool binaries, relative to the repository root
    pub bin_dir: String,
    /// Analyzer `--memory-limit` value
    pub memory_limit: String,
    /// Per-tool timeout
    pub timeout: Option<Duration>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            bin_dir: DEFAULT_BIN_DIR.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT.to_string(),
            timeout: None,
        }
    }
}

impl ToolSettings {
    /// Settings from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            bin_dir: config.bin_dir().to_string(),
            memory_limit: config.memory_limit().to_string(),
            timeout: config.timeout(),
        }
    }

    /// Override the timeout when one is given.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }
}

/// How a tool invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Tool ran and found nothing to report
    Passed,
    /// Tool exited non-zero
    Failed,
    /// Fixer rewrote files; the commit has to be redone
    FilesRewritten,
    /// Binary not found; nothing was spawned
    NotInstalled { binary: PathBuf },
    /// No config candidate exists; nothing was spawned
    MissingConfig {
        candidates: &'static [&'static str],
    },
    /// Tool was killed after the timeout
    TimedOut { after: Duration },
    /// Tool could not be started or waited for
    SpawnFailed { message: String },
}

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Which tool ran
    pub key: ToolKey,
    /// How it ended
    pub status: ToolStatus,
    /// Process exit code (0 when no process ran to completion)
    pub exit_code: i32,
    /// Captured stdout lines
    pub output: Vec<String>,
}

impl ToolResult {
    fn without_process(key: ToolKey, status: ToolStatus) -> Self {
        Self {
            key,
            status,
            exit_code: 0,
            output: Vec::new(),
        }
    }

    /// Whether this tool passed.
    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Passed
    }

    /// Contribution to the aggregate failure sum.
    ///
    /// Zero for a pass, the exit code for a plain tool failure, and one for
    /// every failure that has no meaningful exit code of its own.
    pub fn failure_weight(&self) -> u32 {
        match self.status {
            ToolStatus::Passed => 0,
            ToolStatus::Failed => self.exit_code.unsigned_abs().max(1),
            _ => 1,
        }
    }
}

/// A tool whose preconditions hold, ready to spawn.
#[derive(Debug, Clone)]
pub struct PreparedTool {
    spec: &'static ToolSpec,
    binary: PathBuf,
    args: Vec<OsString>,
}

impl PreparedTool {
    /// Registry entry of the tool.
    pub fn spec(&self) -> &'static ToolSpec {
        self.spec
    }
}

/// Invokes registered tools inside one repository.
pub struct ToolInvoker<'a> {
    paths: &'a RepoPaths,
    settings: &'a ToolSettings,
    runner: &'a dyn ProcessRunner,
}

impl<'a> ToolInvoker<'a> {
    /// Create an invoker for the repository at `paths`.
    pub fn new(
        paths: &'a RepoPaths,
        settings: &'a ToolSettings,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            paths,
            settings,
            runner,
        }
    }

    /// Check a tool's preconditions.
    ///
    /// Returns the failed [`ToolResult`] when the binary or a required
    /// config file is missing.
    pub fn prepare(&self, key: ToolKey) -> Result<PreparedTool, ToolResult> {
        let spec = key.spec();

        let binary = self.paths.tool_binary(&self.settings.bin_dir, spec.binary);
        if !binary.is_file() {
            tracing::debug!(tool = %key, binary = %binary.display(), "binary not found");
            return Err(ToolResult::without_process(
                key,
                ToolStatus::NotInstalled { binary },
            ));
        }

        let config = if spec.requires_config() {
            match spec.resolve_config(&self.paths.work_dir) {
                Some(candidate) => Some(self.paths.in_work_dir(candidate)),
                None => {
                    tracing::debug!(tool = %key, "no config candidate found");
                    return Err(ToolResult::without_process(
                        key,
                        ToolStatus::MissingConfig {
                            candidates: spec.config_candidates,
                        },
                    ));
                }
            }
        } else {
            None
        };

        let args = spec
            .args
            .iter()
            .filter_map(|arg| match arg {
                ArgTemplate::Literal(value) => Some(OsString::from(value)),
                ArgTemplate::ConfigPath => config.as_ref().map(|p| p.clone().into_os_string()),
                ArgTemplate::MemoryLimit => Some(OsString::from(&self.settings.memory_limit)),
            })
            .collect();

        Ok(PreparedTool {
            spec,
            binary,
            args,
        })
    }

    /// Spawn a prepared tool against `files` and interpret its output.
    pub fn execute(&self, tool: &PreparedTool, files: &ChangeSet) -> ToolResult {
        let key = tool.spec.key;
        let mut argv = tool.args.clone();
        argv.push(OsString::from(END_OF_OPTIONS));
        argv.extend(files.paths().iter().map(OsString::from));

        tracing::debug!(
            tool = %key,
            binary = %tool.binary.display(),
            args = ?argv,
            "spawning tool"
        );

        let output = match self.runner.run(
            &tool.binary,
            &argv,
            &self.paths.work_dir,
            self.settings.timeout,
        ) {
            Ok(output) => output,
            Err(InvokeError::TimedOut { after, .. }) => {
                return ToolResult::without_process(key, ToolStatus::TimedOut { after });
            }
            Err(err) => {
                return ToolResult::without_process(
                    key,
                    ToolStatus::SpawnFailed {
                        message: err.to_string(),
                    },
                );
            }
        };

        tracing::debug!(
            tool = %key,
            exit_code = output.exit_code,
            lines = output.stdout.len(),
            "tool finished"
        );

        let status = interpret(tool.spec.output_rule, &output);
        ToolResult {
            key,
            status,
            exit_code: output.exit_code,
            output: output.stdout,
        }
    }

    /// Check preconditions, then run the tool.
    pub fn invoke(&self, key: ToolKey, files: &ChangeSet) -> ToolResult {
        match self.prepare(key) {
            Ok(tool) => self.execute(&tool, files),
            Err(result) => result,
        }
    }
}

/// Decide a tool's status from its output rule.
fn interpret(rule: OutputRule, output: &ProcessOutput) -> ToolStatus {
    match rule {
        OutputRule::RewriteOnOutput
            if output.stdout.iter().any(|line| !line.trim().is_empty()) =>
        {
            ToolStatus::FilesRewritten
        }
        _ if output.exit_code == 0 => ToolStatus::Passed,
        _ => ToolStatus::Failed,
    }
}
