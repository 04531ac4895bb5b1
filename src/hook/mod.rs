//! hook
//!
//! Writes and clears the git `pre-commit` hook.
//!
//! # Script
//!
//! The installed script reattaches the controlling terminal to stdin when
//! one exists (git runs hooks with stdin closed) and then `exec`s
//! `<program> run <flags>`, so the tool's exit code becomes git's
//! pre-commit verdict.
//!
//! Uninstalling truncates the file instead of deleting it. An empty hook
//! is a no-op and the file stays in place for the next install.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::tools::ToolSet;

/// Errors from hook installation.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("no quality tool selected for the hook")]
    NoToolsEnabled,

    #[error("failed to create hooks directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write hook '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Marker line identifying a hook written by this tool.
const MARKER: &str = "# Installed by quality.";

/// Render the hook script body.
///
/// `program` is the command the hook runs; it is single-quoted so paths
/// with spaces or shell metacharacters survive.
pub fn render_script(program: &str, tools: ToolSet) -> String {
    let mut command = vec![shell_quote(program), "run".to_string()];
    command.extend(tools.flags());

    format!(
        "#!/bin/sh\n\
         # Installed by quality. Remove with `quality run uninstall`.\n\
         if (exec < /dev/tty) 2>/dev/null; then\n\
         \x20   exec < /dev/tty\n\
         fi\n\
         exec {}\n",
        command.join(" ")
    )
}

/// Quote a word for POSIX sh.
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Installs and clears the pre-commit hook at a fixed path.
#[derive(Debug, Clone)]
pub struct HookInstaller {
    hook_path: PathBuf,
}

impl HookInstaller {
    /// Create an installer for the hook file at `hook_path`.
    pub fn new(hook_path: PathBuf) -> Self {
        Self { hook_path }
    }

    /// Path of the hook file.
    pub fn hook_path(&self) -> &Path {
        &self.hook_path
    }

    /// Whether a non-empty hook not written by quality is in place.
    pub fn has_foreign_hook(&self) -> bool {
        match fs::read_to_string(&self.hook_path) {
            Ok(contents) => !contents.trim().is_empty() && !contents.contains(MARKER),
            Err(_) => false,
        }
    }

    /// Write a hook that runs `program run` with `tools` enabled.
    ///
    /// Creates the hooks directory if needed and marks the script
    /// executable on Unix. An existing hook is overwritten.
    pub fn install(&self, program: &str, tools: ToolSet) -> Result<(), HookError> {
        if tools.is_empty() {
            return Err(HookError::NoToolsEnabled);
        }

        if let Some(parent) = self.hook_path.parent() {
            fs::create_dir_all(parent).map_err(|source| HookError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.write(render_script(program, tools).as_bytes())?;
        make_executable(&self.hook_path).map_err(|source| HookError::Write {
            path: self.hook_path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.hook_path.display(), "hook installed");
        Ok(())
    }

    /// Empty the hook file, leaving it in place.
    pub fn uninstall(&self) -> Result<(), HookError> {
        if let Some(parent) = self.hook_path.parent() {
            fs::create_dir_all(parent).map_err(|source| HookError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.write(b"")?;
        tracing::debug!(path = %self.hook_path.display(), "hook cleared");
        Ok(())
    }

    fn write(&self, contents: &[u8]) -> Result<(), HookError> {
        fs::write(&self.hook_path, contents).map_err(|source| HookError::Write {
            path: self.hook_path.clone(),
            source,
        })
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn script_reinvokes_run_with_flags() {
        let script = render_script("/usr/local/bin/quality", ToolSet::from_flags(true, true));
        insta::assert_snapshot!(script, @r###"
        #!/bin/sh
        # Installed by quality. Remove with `quality run uninstall`.
        if (exec < /dev/tty) 2>/dev/null; then
            exec < /dev/tty
        fi
        exec /usr/local/bin/quality run --fixer --analyzer
        "###);
    }

    #[test]
    fn script_keeps_declared_order_for_single_tool() {
        let script = render_script("quality", ToolSet::from_flags(false, true));
        assert!(script.ends_with("exec quality run --analyzer\n"));
    }

    #[test]
    fn program_with_spaces_is_quoted() {
        let script = render_script("/opt/my tools/quality", ToolSet::from_flags(true, false));
        assert!(script.contains("exec '/opt/my tools/quality' run --fixer\n"));
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("plain/path-1.0"), "plain/path-1.0");
    }

    #[test]
    fn install_creates_hooks_dir_and_script() {
        let temp = TempDir::new().unwrap();
        let hook = temp.path().join("hooks/pre-commit");
        let installer = HookInstaller::new(hook.clone());

        installer
            .install("quality", ToolSet::from_flags(true, false))
            .unwrap();

        let contents = fs::read_to_string(&hook).unwrap();
        assert!(contents.starts_with("#!/bin/sh\n"));
        assert!(contents.contains("exec quality run --fixer"));
    }

    #[cfg(unix)]
    #[test]
    fn install_marks_script_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let installer = HookInstaller::new(temp.path().join("pre-commit"));
        installer
            .install("quality", ToolSet::from_flags(true, true))
            .unwrap();

        let mode = fs::metadata(installer.hook_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn install_without_tools_rejected() {
        let temp = TempDir::new().unwrap();
        let installer = HookInstaller::new(temp.path().join("pre-commit"));

        let err = installer.install("quality", ToolSet::default()).unwrap_err();
        assert!(matches!(err, HookError::NoToolsEnabled));
        assert!(!installer.hook_path().exists());
    }

    #[test]
    fn install_then_uninstall_leaves_empty_file() {
        let temp = TempDir::new().unwrap();
        let installer = HookInstaller::new(temp.path().join("pre-commit"));

        installer
            .install("quality", ToolSet::from_flags(true, true))
            .unwrap();
        installer.uninstall().unwrap();

        assert!(installer.hook_path().exists());
        assert_eq!(fs::read(installer.hook_path()).unwrap(), b"");
    }

    #[test]
    fn foreign_hook_detection() {
        let temp = TempDir::new().unwrap();
        let installer = HookInstaller::new(temp.path().join("pre-commit"));
        assert!(!installer.has_foreign_hook());

        fs::write(installer.hook_path(), "#!/bin/sh\nmake lint\n").unwrap();
        assert!(installer.has_foreign_hook());

        installer
            .install("quality", ToolSet::from_flags(true, false))
            .unwrap();
        assert!(!installer.has_foreign_hook());

        installer.uninstall().unwrap();
        assert!(!installer.has_foreign_hook());
    }

    #[test]
    fn uninstall_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let installer = HookInstaller::new(temp.path().join("hooks/pre-commit"));

        installer.uninstall().unwrap();
        installer.uninstall().unwrap();

        assert_eq!(fs::read(installer.hook_path()).unwrap(), b"");
    }
}
