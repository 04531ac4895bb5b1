//! core::changes
//!
//! Working tree changes in short status form.
//!
//! # Types
//!
//! - [`StatusCode`] - Two-column `XY` status code (index, worktree)
//! - [`StatusEntry`] - One status line: a code and a repository-relative path
//! - [`ChangeSet`] - Ordered paths handed to quality tools (deletions excluded)
//!
//! # Short Format
//!
//! Entries render as `XY path`, the same layout `git status --short`
//! prints, and parse back from it. The parser also accepts a collapsed
//! single-letter code (`M a.php`) and takes the destination of a rename
//! (`R  old.php -> new.php` yields `new.php`).
//!
//! # Example
//!
//! ```
//! use quality_hook::core::changes::{ChangeSet, StatusEntry};
//!
//! let entries: Vec<StatusEntry> = ["M a.php", "D b.php", "A c.php"]
//!     .iter()
//!     .map(|line| line.parse().unwrap())
//!     .collect();
//!
//! let changes = ChangeSet::from_entries(entries);
//! assert_eq!(changes.paths(), ["a.php", "c.php"]);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing a short status line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChangeParseError {
    #[error("empty status line")]
    Empty,

    #[error("status line has no path: '{0}'")]
    MissingPath(String),

    #[error("unknown status code '{code}' in line '{line}'")]
    UnknownCode { code: String, line: String },
}

/// Letters allowed in either column of a status code.
const KNOWN_CODES: &[char] = &[' ', 'M', 'A', 'D', 'R', 'C', 'T', 'U', '?', '!'];

/// Two-column status code.
///
/// The first column describes the index relative to HEAD, the second the
/// worktree relative to the index. A space means "unchanged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode {
    /// Index column
    pub index: char,
    /// Worktree column
    pub worktree: char,
}

impl StatusCode {
    /// Create a status code from its two columns.
    pub fn new(index: char, worktree: char) -> Self {
        Self { index, worktree }
    }

    /// Code for a file git does not track yet.
    pub fn untracked() -> Self {
        Self::new('?', '?')
    }

    /// Whether the file is gone from the worktree or the index.
    pub fn is_deleted(&self) -> bool {
        self.index == 'D' || self.worktree == 'D'
    }

    /// Whether neither column reports a change.
    pub fn is_unmodified(&self) -> bool {
        self.index == ' ' && self.worktree == ' '
    }

    fn parse(code: &str, line: &str) -> Result<Self, ChangeParseError> {
        let mut chars = code.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            // A collapsed code such as "M" describes the index column.
            (Some(index), None, None) => Self::new(index, ' '),
            (Some(index), Some(worktree), None) => Self::new(index, worktree),
            _ => {
                return Err(ChangeParseError::UnknownCode {
                    code: code.to_string(),
                    line: line.to_string(),
                })
            }
        };

        if !KNOWN_CODES.contains(&parsed.index) || !KNOWN_CODES.contains(&parsed.worktree) {
            return Err(ChangeParseError::UnknownCode {
                code: code.to_string(),
                line: line.to_string(),
            });
        }

        Ok(parsed)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.index, self.worktree)
    }
}

/// One changed path as reported by the status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Change kind
    pub code: StatusCode,
    /// Path relative to the repository root (destination path for renames)
    pub path: String,
}

impl StatusEntry {
    /// Create a status entry.
    pub fn new(code: StatusCode, path: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
        }
    }

    /// Whether this entry describes a deleted file.
    pub fn is_deleted(&self) -> bool {
        self.code.is_deleted()
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.path)
    }
}

impl FromStr for StatusEntry {
    type Err = ChangeParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ChangeParseError::Empty);
        }

        // Full two-column layout: "XY path".
        let (code, rest) = match line.char_indices().nth(2) {
            Some((idx, ' ')) => (&line[..idx], &line[idx + 1..]),
            _ => line
                .trim_start()
                .split_once(' ')
                .ok_or_else(|| ChangeParseError::MissingPath(line.to_string()))?,
        };

        let code = StatusCode::parse(code, line)?;

        let rest = rest.trim_start();
        let path = match rest.rsplit_once(" -> ") {
            Some((_, to)) => to,
            None => rest,
        };
        let path = unquote(path);
        if path.is_empty() {
            return Err(ChangeParseError::MissingPath(line.to_string()));
        }

        Ok(Self::new(code, path))
    }
}

/// Strip the double quotes git puts around paths with special characters.
fn unquote(path: &str) -> String {
    match path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => path.to_string(),
    }
}

/// The paths a run hands to quality tools.
///
/// Order follows the status query. Deleted files never appear. Paths are
/// kept as individual values so each becomes its own argv element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: Vec<String>,
}

impl ChangeSet {
    /// Build a change set from status entries, dropping deletions.
    pub fn from_entries(entries: impl IntoIterator<Item = StatusEntry>) -> Self {
        let paths = entries
            .into_iter()
            .filter(|entry| !entry.is_deleted() && !entry.code.is_unmodified())
            .map(|entry| entry.path)
            .collect();
        Self { paths }
    }

    /// The changed paths in status order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of changed paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
