//! Property-based tests for status parsing and change filtering.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated status lines.

use proptest::prelude::*;

use quality_hook::core::changes::{ChangeSet, StatusCode, StatusEntry};
use quality_hook::core::tools::ToolSet;

/// Strategy for one column of a status code.
fn status_column() -> impl Strategy<Value = char> {
    prop_oneof![
        Just(' '),
        Just('M'),
        Just('A'),
        Just('D'),
        Just('R'),
        Just('C'),
        Just('T'),
        Just('U'),
    ]
}

/// Strategy for a code that reports some change.
fn status_code() -> impl Strategy<Value = StatusCode> {
    prop_oneof![
        Just(StatusCode::untracked()),
        (status_column(), status_column())
            .prop_filter("must report a change", |(x, y)| *x != ' ' || *y != ' ')
            .prop_map(|(x, y)| StatusCode::new(x, y)),
    ]
}

/// Strategy for repository-relative paths without quoting or arrows.
fn repo_path() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}(/[a-z0-9_]{1,8}){0,3}\\.php"
}

fn status_entry() -> impl Strategy<Value = StatusEntry> {
    (status_code(), repo_path()).prop_map(|(code, path)| StatusEntry::new(code, path))
}

proptest! {
    /// Rendering then parsing an entry yields the same entry.
    #[test]
    fn short_format_is_stable(entry in status_entry()) {
        let parsed: StatusEntry = entry.to_string().parse().unwrap();
        prop_assert_eq!(parsed, entry);
    }

    /// Deleted entries never reach a tool; everything else does, in order.
    #[test]
    fn change_set_drops_exactly_the_deletions(
        entries in prop::collection::vec(status_entry(), 0..20)
    ) {
        let expected: Vec<String> = entries
            .iter()
            .filter(|e| e.code.index != 'D' && e.code.worktree != 'D')
            .map(|e| e.path.clone())
            .collect();

        let changes = ChangeSet::from_entries(entries);
        prop_assert_eq!(changes.paths(), expected.as_slice());
    }

    /// The renamed side of a rename line is what gets checked.
    #[test]
    fn rename_resolves_to_destination(from in repo_path(), to in repo_path()) {
        let entry: StatusEntry = format!("R  {} -> {}", from, to).parse().unwrap();
        prop_assert!(!entry.is_deleted());
        prop_assert_eq!(&entry.path, &to);
    }

    /// Parsing arbitrary text never panics.
    #[test]
    fn parser_never_panics(line in "\\PC{0,40}") {
        let _ = line.parse::<StatusEntry>();
    }

    /// Union keeps every tool from both sides and flags follow registry order.
    #[test]
    fn tool_set_union(a in any::<(bool, bool)>(), b in any::<(bool, bool)>()) {
        let left = ToolSet::from_flags(a.0, a.1);
        let right = ToolSet::from_flags(b.0, b.1);
        let both = left.union(right);

        prop_assert_eq!(both, ToolSet::from_flags(a.0 || b.0, a.1 || b.1));

        let flags = both.flags();
        if a.0 || b.0 {
            prop_assert_eq!(flags.first().map(String::as_str), Some("--fixer"));
        }
        prop_assert_eq!(flags.len(), both.keys().count());
    }
}
