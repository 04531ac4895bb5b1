//! Integration tests for the git layer.
//!
//! Repositories are built with the git CLI so the status and path queries
//! are checked against what git itself produces.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use quality_hook::core::changes::StatusCode;
use quality_hook::git::{ChangeSource, Git, GitError};

struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        let repo = Self { dir };
        repo.write("README.md", "# Test Repo\n");
        repo.write("src/keep.php", "<?php\n");
        repo.write("src/old.php", "<?php // old\n");
        repo.write("src/gone.php", "<?php // gone\n");
        run_git(repo.path(), &["add", "-A"]);
        run_git(repo.path(), &["commit", "-m", "Initial commit"]);
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    fn write(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

fn run_git_allow_failure(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git")
        .status
        .success()
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

#[test]
fn clean_repository_has_no_changes() {
    let repo = TestRepo::new();
    assert!(repo.git().changed_files().unwrap().is_empty());
}

#[test]
fn open_from_subdirectory_finds_root() {
    let repo = TestRepo::new();
    let git = Git::open(&repo.path().join("src")).unwrap();

    let info = git.info().unwrap();
    assert_eq!(canonical(&info.work_dir), canonical(repo.path()));
}

#[test]
fn open_outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Git::open(dir.path()),
        Err(GitError::NotARepo { .. })
    ));
}

#[test]
fn bare_repository_is_rejected() {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "--bare"]);
    assert!(matches!(Git::open(dir.path()), Err(GitError::BareRepo)));
}

#[test]
fn mixed_changes_are_collected_without_deletions() {
    let repo = TestRepo::new();
    repo.write("src/keep.php", "<?php // edited\n");
    repo.write("src/new/added.php", "<?php\n");
    fs::remove_file(repo.path().join("src/gone.php")).unwrap();
    run_git(repo.path(), &["mv", "src/old.php", "src/renamed.php"]);

    let git = repo.git();
    let entries = git.status_entries().unwrap();
    let gone = entries
        .iter()
        .find(|e| e.path == "src/gone.php")
        .expect("deletion reported");
    assert!(gone.is_deleted());

    let untracked = entries
        .iter()
        .find(|e| e.path == "src/new/added.php")
        .expect("untracked file reported");
    assert_eq!(untracked.code, StatusCode::untracked());

    let mut paths = git.changed_files().unwrap().paths().to_vec();
    paths.sort();
    assert_eq!(
        paths,
        ["src/keep.php", "src/new/added.php", "src/renamed.php"]
    );
}

#[test]
fn staged_deletion_is_excluded() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["rm", "-q", "src/gone.php"]);

    assert!(repo.git().changed_files().unwrap().is_empty());
}

#[test]
fn merge_conflicts_report_their_kind() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-q", "-b", "side"]);
    run_git(repo.path(), &["rm", "-q", "src/gone.php"]);
    repo.write("src/keep.php", "<?php // side\n");
    run_git(repo.path(), &["commit", "-qam", "Side changes"]);

    run_git(repo.path(), &["checkout", "-q", "main"]);
    repo.write("src/gone.php", "<?php // still here\n");
    repo.write("src/keep.php", "<?php // main\n");
    run_git(repo.path(), &["commit", "-qam", "Main changes"]);
    assert!(!run_git_allow_failure(repo.path(), &["merge", "side"]));

    let git = repo.git();
    let entries = git.status_entries().unwrap();
    let code_of = |path: &str| {
        entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.code)
            .unwrap_or_else(|| panic!("{} not reported: {:?}", path, entries))
    };
    assert_eq!(code_of("src/gone.php"), StatusCode::new('U', 'D'));
    assert_eq!(code_of("src/keep.php"), StatusCode::new('U', 'U'));

    assert_eq!(git.changed_files().unwrap().paths(), ["src/keep.php"]);
}

#[test]
fn ignored_files_are_skipped() {
    let repo = TestRepo::new();
    repo.write(".gitignore", "cache/\n");
    repo.write("cache/tmp.php", "<?php\n");

    let changes = repo.git().changed_files().unwrap();
    assert_eq!(changes.paths(), [".gitignore"]);
}

#[test]
fn default_hooks_dir_is_in_git_dir() {
    let repo = TestRepo::new();
    let paths = repo.git().paths().unwrap();

    assert_eq!(
        canonical(&paths.common_dir),
        canonical(&repo.path().join(".git"))
    );
    assert_eq!(paths.hook_path(), paths.common_dir.join("hooks/pre-commit"));
}

#[test]
fn linked_worktree_shares_hooks_and_config() {
    let repo = TestRepo::new();
    let other = TempDir::new().unwrap();
    let worktree = other.path().join("wt");
    run_git(
        repo.path(),
        &["worktree", "add", "-q", "-b", "side", worktree.to_str().unwrap()],
    );

    let paths = Git::open(&worktree).unwrap().paths().unwrap();
    assert_eq!(canonical(&paths.work_dir), canonical(&worktree));
    assert_eq!(
        canonical(&paths.common_dir),
        canonical(&repo.path().join(".git"))
    );
    assert!(paths.repo_config_path().starts_with(&paths.common_dir));
}
