//! core::paths
//!
//! Centralized path routing for a repository.
//!
//! # Architecture
//!
//! The repository root, the git metadata directory, and the hooks
//! directory are resolved once per process through [`crate::git::Git`]
//! and carried in [`RepoPaths`]. Nothing else re-derives them.
//!
//! - Tool binaries live under `<work_dir>/<bin_dir>/`
//! - Tool config candidates are probed at `<work_dir>/`
//! - The hook script is `<hooks_dir>/pre-commit`
//! - Repo config is `<common_dir>/quality/config.toml`
//!
//! # Example
//!
//! ```
//! use quality_hook::core::paths::RepoPaths;
//! use std::path::PathBuf;
//!
//! let paths = RepoPaths::new(
//!     PathBuf::from("/repo"),
//!     PathBuf::from("/repo/.git"),
//!     PathBuf::from("/repo/.git/hooks"),
//! );
//!
//! assert_eq!(paths.hook_path(), PathBuf::from("/repo/.git/hooks/pre-commit"));
//! assert_eq!(
//!     paths.tool_binary("vendor/bin", "phpstan"),
//!     PathBuf::from("/repo/vendor/bin/phpstan")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::config::Config;

/// Name of the hook file git runs before each commit.
pub const PRE_COMMIT_HOOK: &str = "pre-commit";

/// Resolved locations inside one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPaths {
    /// Root of the working tree. Tools run here and status paths are
    /// relative to it.
    pub work_dir: PathBuf,

    /// Shared git directory (refs, objects, config, hooks by default).
    pub common_dir: PathBuf,

    /// Directory git looks in for hooks (honours `core.hooksPath`).
    pub hooks_dir: PathBuf,
}

impl RepoPaths {
    /// Create paths from already-resolved directories.
    pub fn new(work_dir: PathBuf, common_dir: PathBuf, hooks_dir: PathBuf) -> Self {
        Self {
            work_dir,
            common_dir,
            hooks_dir,
        }
    }

    /// Path of the pre-commit hook script.
    pub fn hook_path(&self) -> PathBuf {
        self.hooks_dir.join(PRE_COMMIT_HOOK)
    }

    /// Path of the repo-scoped config file.
    pub fn repo_config_path(&self) -> PathBuf {
        Config::repo_config_path(&self.common_dir)
    }

    /// Expected location of a tool binary.
    pub fn tool_binary(&self, bin_dir: &str, binary: &str) -> PathBuf {
        self.work_dir.join(bin_dir).join(binary)
    }

    /// Absolute path of a file given relative to the repository root.
    pub fn in_work_dir(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(relative)
    }
}
