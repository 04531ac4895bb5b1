//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to the repository. Discovery,
//! path resolution, and the working tree status query all flow through
//! [`Git`], which normalises git2 errors into [`GitError`].
//!
//! # Example
//!
//! ```ignore
//! use quality_hook::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for entry in git.status_entries()? {
//!     println!("{}", entry);
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::changes::{ChangeSet, StatusCode, StatusEntry};
use crate::core::paths::RepoPaths;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Repository configuration could not be read.
    #[error("failed to read git config: {message}")]
    Config {
        /// The error message
        message: String,
    },

    /// The status query failed.
    #[error("failed to read repository status: {message}")]
    Status {
        /// The error message
        message: String,
    },
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to the shared git directory
    pub common_dir: PathBuf,
    /// Path to the working directory
    pub work_dir: PathBuf,
}

/// Source of working tree changes.
///
/// Implemented by [`Git`] for real repositories; tests supply fixed
/// entries.
pub trait ChangeSource {
    /// Every changed path with its status code, in status order.
    fn status_entries(&self) -> Result<Vec<StatusEntry>, GitError>;

    /// Changed paths that tools can act on (deletions removed).
    fn changed_files(&self) -> Result<ChangeSet, GitError> {
        Ok(ChangeSet::from_entries(self.status_entries()?))
    }
}

/// The Git interface.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so any directory inside the
    /// working tree works.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository contains `path`
    /// - [`GitError::BareRepo`] if the repository has no working tree
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository directory information.
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?;
        Ok(RepoInfo {
            common_dir: self.repo.commondir().to_path_buf(),
            work_dir: work_dir.to_path_buf(),
        })
    }

    /// Directory git runs hooks from.
    ///
    /// Honours `core.hooksPath` (relative values resolve against the
    /// working tree root), falling back to `<common dir>/hooks`.
    pub fn hooks_dir(&self) -> Result<PathBuf, GitError> {
        let info = self.info()?;
        let config = self.repo.config().map_err(|e| GitError::Config {
            message: e.message().to_string(),
        })?;

        match config.get_path("core.hooksPath") {
            Ok(path) if path.is_absolute() => Ok(path),
            Ok(path) => Ok(info.work_dir.join(path)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(info.common_dir.join("hooks")),
            Err(e) => Err(GitError::Config {
                message: e.message().to_string(),
            }),
        }
    }

    /// Resolve every location a run needs, once.
    pub fn paths(&self) -> Result<RepoPaths, GitError> {
        let info = self.info()?;
        let hooks_dir = self.hooks_dir()?;
        Ok(RepoPaths::new(info.work_dir, info.common_dir, hooks_dir))
    }

    /// Query the working tree status.
    ///
    /// Untracked directories are expanded to their files, renames staged in
    /// the index report their destination path, and ignored files and
    /// submodules are skipped. Conflicted paths get the porcelain code of
    /// their conflict kind (`DD`, `AU`, `UD`, ...). Paths that are not valid
    /// UTF-8 are skipped with a warning.
    pub fn status_entries(&self) -> Result<Vec<StatusEntry>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true)
            .renames_head_to_index(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Status {
                message: e.message().to_string(),
            })?;

        let conflicts = if statuses.iter().any(|e| e.status().is_conflicted()) {
            self.conflict_codes()?
        } else {
            HashMap::new()
        };

        let mut entries = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let status = entry.status();
            if status.is_ignored() {
                continue;
            }

            let path = entry
                .head_to_index()
                .and_then(|delta| delta.new_file().path().map(Path::to_path_buf))
                .or_else(|| {
                    entry
                        .index_to_workdir()
                        .and_then(|delta| delta.new_file().path().map(Path::to_path_buf))
                })
                .or_else(|| entry.path().map(PathBuf::from));

            let Some(path) = path.as_deref().and_then(Path::to_str) else {
                tracing::warn!(
                    path = %String::from_utf8_lossy(entry.path_bytes()),
                    "skipping path that is not valid UTF-8"
                );
                continue;
            };

            let code = match conflicts.get(path) {
                Some(code) if status.is_conflicted() => *code,
                _ => short_code(status),
            };
            entries.push(StatusEntry::new(code, path));
        }

        Ok(entries)
    }

    /// Porcelain codes for every conflicted path in the index.
    fn conflict_codes(&self) -> Result<HashMap<String, StatusCode>, GitError> {
        let status_error = |e: git2::Error| GitError::Status {
            message: e.message().to_string(),
        };
        let index = self.repo.index().map_err(status_error)?;

        let mut codes = HashMap::new();
        for conflict in index.conflicts().map_err(status_error)? {
            let conflict = conflict.map_err(status_error)?;
            let path = [&conflict.ancestor, &conflict.our, &conflict.their]
                .into_iter()
                .flatten()
                .next()
                .map(|side| String::from_utf8_lossy(&side.path).into_owned());

            if let Some(path) = path {
                let code = conflict_code(
                    conflict.ancestor.is_some(),
                    conflict.our.is_some(),
                    conflict.their.is_some(),
                );
                codes.insert(path, code);
            }
        }
        Ok(codes)
    }
}

impl ChangeSource for Git {
    fn status_entries(&self) -> Result<Vec<StatusEntry>, GitError> {
        Git::status_entries(self)
    }
}

/// Porcelain code for a conflict, from which stages are present.
fn conflict_code(ancestor: bool, ours: bool, theirs: bool) -> StatusCode {
    let (index, worktree) = match (ancestor, ours, theirs) {
        (true, false, false) => ('D', 'D'),
        (false, true, false) => ('A', 'U'),
        (false, false, true) => ('U', 'A'),
        (true, true, false) => ('U', 'D'),
        (true, false, true) => ('D', 'U'),
        (false, true, true) => ('A', 'A'),
        _ => ('U', 'U'),
    };
    StatusCode::new(index, worktree)
}

/// Translate git2 status flags into a short-format code.
///
/// Conflicts fall back to `UU` here; [`Git::status_entries`] refines them
/// from the index.
fn short_code(status: git2::Status) -> StatusCode {
    if status.is_conflicted() {
        return StatusCode::new('U', 'U');
    }
    if status.is_wt_new() {
        return StatusCode::untracked();
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    StatusCode::new(index, worktree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Initialise a repository with one committed file.
    fn init_repo() -> (TempDir, git2::Repository) {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("README.md"), "# Test\n").unwrap();
        commit_all(&repo, "Initial commit");
        (dir, repo)
    }

    fn commit_all(repo: &git2::Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    fn stage(repo: &git2::Repository, path: &str) {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    mod short_code {
        use super::*;

        #[test]
        fn untracked() {
            assert_eq!(short_code(git2::Status::WT_NEW), StatusCode::untracked());
        }

        #[test]
        fn staged_and_modified() {
            let status = git2::Status::INDEX_MODIFIED | git2::Status::WT_MODIFIED;
            assert_eq!(short_code(status), StatusCode::new('M', 'M'));
        }

        #[test]
        fn worktree_deletion() {
            assert_eq!(
                short_code(git2::Status::WT_DELETED),
                StatusCode::new(' ', 'D')
            );
        }

        #[test]
        fn conflict() {
            assert_eq!(
                short_code(git2::Status::CONFLICTED),
                StatusCode::new('U', 'U')
            );
        }
    }

    mod conflict_code {
        use super::*;

        #[test]
        fn deleted_sides_carry_d() {
            assert_eq!(conflict_code(true, false, false), StatusCode::new('D', 'D'));
            assert_eq!(conflict_code(true, true, false), StatusCode::new('U', 'D'));
            assert_eq!(conflict_code(true, false, true), StatusCode::new('D', 'U'));
            for code in [
                conflict_code(true, false, false),
                conflict_code(true, true, false),
                conflict_code(true, false, true),
            ] {
                assert!(code.is_deleted());
            }
        }

        #[test]
        fn added_and_modified_sides() {
            assert_eq!(conflict_code(false, true, false), StatusCode::new('A', 'U'));
            assert_eq!(conflict_code(false, false, true), StatusCode::new('U', 'A'));
            assert_eq!(conflict_code(false, true, true), StatusCode::new('A', 'A'));
            assert_eq!(conflict_code(true, true, true), StatusCode::new('U', 'U'));
        }
    }

    mod repository {
        use super::*;

        #[test]
        fn open_outside_repo_fails() {
            let dir = TempDir::new().unwrap();
            let err = Git::open(dir.path()).unwrap_err();
            assert!(matches!(err, GitError::NotARepo { .. }));
        }

        #[test]
        fn open_bare_repo_fails() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init_bare(dir.path()).unwrap();
            let err = Git::open(dir.path()).unwrap_err();
            assert!(matches!(err, GitError::BareRepo));
        }

        #[test]
        fn open_from_subdirectory() {
            let (dir, _repo) = init_repo();
            let sub = dir.path().join("src/deep");
            fs::create_dir_all(&sub).unwrap();

            let git = Git::open(&sub).unwrap();
            let info = git.info().unwrap();
            assert_eq!(
                info.work_dir.canonicalize().unwrap(),
                dir.path().canonicalize().unwrap()
            );
        }

        #[test]
        fn hooks_dir_defaults_to_git_dir() {
            let (dir, _repo) = init_repo();
            let git = Git::open(dir.path()).unwrap();
            let hooks = git.hooks_dir().unwrap();
            assert!(hooks.ends_with(".git/hooks"));
        }

        #[test]
        fn hooks_dir_honours_hooks_path() {
            let (dir, repo) = init_repo();
            repo.config()
                .unwrap()
                .set_str("core.hooksPath", ".githooks")
                .unwrap();

            let git = Git::open(dir.path()).unwrap();
            let paths = git.paths().unwrap();
            assert_eq!(paths.hooks_dir, paths.work_dir.join(".githooks"));
        }
    }

    mod status {
        use super::*;

        #[test]
        fn clean_tree_has_no_entries() {
            let (dir, _repo) = init_repo();
            let git = Git::open(dir.path()).unwrap();
            assert!(git.status_entries().unwrap().is_empty());
            assert!(git.changed_files().unwrap().is_empty());
        }

        #[test]
        fn reports_each_change_kind() {
            let (dir, repo) = init_repo();
            fs::write(dir.path().join("gone.php"), "<?php").unwrap();
            fs::write(dir.path().join("kept.php"), "<?php").unwrap();
            commit_all(&repo, "Add files");

            fs::write(dir.path().join("kept.php"), "<?php echo 1;").unwrap();
            fs::remove_file(dir.path().join("gone.php")).unwrap();
            fs::write(dir.path().join("staged.php"), "<?php").unwrap();
            stage(&repo, "staged.php");
            fs::create_dir_all(dir.path().join("new dir")).unwrap();
            fs::write(dir.path().join("new dir/Untracked File.php"), "<?php").unwrap();

            let git = Git::open(dir.path()).unwrap();
            let entries = git.status_entries().unwrap();
            let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();

            assert!(lines.contains(&" D gone.php".to_string()), "{:?}", lines);
            assert!(lines.contains(&" M kept.php".to_string()), "{:?}", lines);
            assert!(lines.contains(&"A  staged.php".to_string()), "{:?}", lines);
            assert!(
                lines.contains(&"?? new dir/Untracked File.php".to_string()),
                "{:?}",
                lines
            );

            let mut changed = git.changed_files().unwrap().paths().to_vec();
            changed.sort();
            assert_eq!(
                changed,
                ["kept.php", "new dir/Untracked File.php", "staged.php"]
            );
        }

        #[test]
        fn ignored_files_skipped() {
            let (dir, repo) = init_repo();
            fs::write(dir.path().join(".gitignore"), "cache/\n").unwrap();
            commit_all(&repo, "Ignore cache");
            fs::create_dir_all(dir.path().join("cache")).unwrap();
            fs::write(dir.path().join("cache/blob.php"), "<?php").unwrap();

            let git = Git::open(dir.path()).unwrap();
            assert!(git.changed_files().unwrap().is_empty());
        }

        #[cfg(target_os = "linux")]
        #[test]
        fn non_utf8_paths_skipped() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let (dir, _repo) = init_repo();
            fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.php")), "<?php").unwrap();
            fs::write(dir.path().join("good.php"), "<?php").unwrap();

            let git = Git::open(dir.path()).unwrap();
            assert_eq!(git.changed_files().unwrap().paths(), ["good.php"]);
        }
    }
}
