//! core::tools
//!
//! Static registry of the quality tools a run can dispatch.
//!
//! # Design
//!
//! Each tool is described by a [`ToolSpec`]: the binary to resolve, the
//! config files it needs, how its argv is built, and how its output is
//! judged. The dispatcher only walks [`REGISTRY`] in declared order, so a
//! new tool is a new table entry.
//!
//! # Example
//!
//! ```
//! use quality_hook::core::tools::{ToolKey, ToolSet};
//!
//! let tools = ToolSet::from_flags(true, true);
//! assert_eq!(tools.describe(), "PHP-CS-FIXER and PHPSTAN");
//! assert_eq!(tools.keys().collect::<Vec<_>>(), [ToolKey::Fixer, ToolKey::Analyzer]);
//! ```

use std::fmt;
use std::path::Path;

/// Stable identifier of a registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolKey {
    /// Style fixer (rewrites files)
    Fixer,
    /// Static analyzer (reports diagnostics)
    Analyzer,
}

impl ToolKey {
    /// Every key, in declared run order.
    pub const ALL: [ToolKey; 2] = [ToolKey::Fixer, ToolKey::Analyzer];

    /// The key as it appears in flags and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKey::Fixer => "fixer",
            ToolKey::Analyzer => "analyzer",
        }
    }

    /// The registry entry for this key.
    pub fn spec(&self) -> &'static ToolSpec {
        match self {
            ToolKey::Fixer => &REGISTRY[0],
            ToolKey::Analyzer => &REGISTRY[1],
        }
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a tool's argument template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgTemplate {
    /// Passed through unchanged
    Literal(&'static str),
    /// Absolute path of the resolved config file
    ConfigPath,
    /// Analyzer memory limit from settings
    MemoryLimit,
}

/// How a tool's captured output decides the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRule {
    /// Any non-empty stdout line means files were rewritten, which fails
    /// the run regardless of exit code.
    RewriteOnOutput,
    /// Exit code decides; on failure the full output is shown verbatim.
    ReportOnFailure,
}

/// Static description of an external quality tool.
#[derive(Debug, PartialEq, Eq)]
pub struct ToolSpec {
    /// Stable key
    pub key: ToolKey,
    /// Name shown to the user
    pub display_name: &'static str,
    /// Binary file name under the tool bin directory
    pub binary: &'static str,
    /// Config files probed at the repository root, highest priority first.
    /// Empty when the tool needs no config.
    pub config_candidates: &'static [&'static str],
    /// Arguments placed before the changed files
    pub args: &'static [ArgTemplate],
    /// Output interpretation
    pub output_rule: OutputRule,
    /// Line printed before the tool starts
    pub progress: &'static str,
}

impl ToolSpec {
    /// Whether the tool refuses to run without a config file.
    pub fn requires_config(&self) -> bool {
        !self.config_candidates.is_empty()
    }

    /// First config candidate that exists under `root`.
    pub fn resolve_config(&self, root: &Path) -> Option<&'static str> {
        self.config_candidates
            .iter()
            .copied()
            .find(|candidate| root.join(candidate).is_file())
    }
}

/// All registered tools in declared run order.
pub static REGISTRY: [ToolSpec; 2] = [
    ToolSpec {
        key: ToolKey::Fixer,
        display_name: "php-cs-fixer",
        binary: "php-cs-fixer",
        config_candidates: &[".php-cs-fixer.php", ".php-cs-fixer.dist.php"],
        args: &[
            ArgTemplate::Literal("fix"),
            ArgTemplate::Literal("--config"),
            ArgTemplate::ConfigPath,
        ],
        output_rule: OutputRule::RewriteOnOutput,
        progress: "PHP CS Fixer fixing ...",
    },
    ToolSpec {
        key: ToolKey::Analyzer,
        display_name: "phpstan",
        binary: "phpstan",
        config_candidates: &[],
        args: &[
            ArgTemplate::Literal("analyse"),
            ArgTemplate::Literal("--debug"),
            ArgTemplate::Literal("--memory-limit"),
            ArgTemplate::MemoryLimit,
        ],
        output_rule: OutputRule::ReportOnFailure,
        progress: "PHPStan analysing ...",
    },
];

/// The set of tools enabled for a run or baked into a hook.
///
/// Iteration always follows the declared registry order, whatever order
/// the flags were given in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSet {
    fixer: bool,
    analyzer: bool,
}

impl ToolSet {
    /// Build a tool set from the CLI flags.
    pub fn from_flags(fixer: bool, analyzer: bool) -> Self {
        Self { fixer, analyzer }
    }

    /// Whether a tool is enabled.
    pub fn contains(&self, key: ToolKey) -> bool {
        match key {
            ToolKey::Fixer => self.fixer,
            ToolKey::Analyzer => self.analyzer,
        }
    }

    /// Whether no tool is enabled.
    pub fn is_empty(&self) -> bool {
        !self.fixer && !self.analyzer
    }

    /// Union of two tool sets.
    pub fn union(self, other: ToolSet) -> Self {
        Self {
            fixer: self.fixer || other.fixer,
            analyzer: self.analyzer || other.analyzer,
        }
    }

    /// Enabled keys in declared order.
    pub fn keys(&self) -> impl Iterator<Item = ToolKey> + '_ {
        ToolKey::ALL.into_iter().filter(|key| self.contains(*key))
    }

    /// Enabled tool names uppercased and joined with "and".
    pub fn describe(&self) -> String {
        self.keys()
            .map(|key| key.spec().display_name.to_uppercase())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// CLI flags that re-enable this set, in declared order.
    pub fn flags(&self) -> Vec<String> {
        self.keys().map(|key| format!("--{}", key)).collect()
    }
}
