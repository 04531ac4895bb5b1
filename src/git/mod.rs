//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`, and nothing shells out to the git CLI: repository discovery,
//! hooks directory resolution, and the status query all live here.
//!
//! # Responsibilities
//!
//! - Repository discovery and root resolution
//! - Hooks directory lookup (`core.hooksPath` aware)
//! - Working tree status in short form
//!
//! # Example
//!
//! ```ignore
//! use quality_hook::git::{ChangeSource, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let changes = git.changed_files()?;
//! println!("{} files changed", changes.len());
//! ```

mod interface;

pub use interface::{ChangeSource, Git, GitError, RepoInfo};
