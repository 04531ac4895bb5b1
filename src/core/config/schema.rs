//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$QUALITY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/quality/config.toml`
//! 3. `~/.quality/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! Located at `.git/quality/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing so a bad value is reported
//! before any tool runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// interactive = true
/// timeout_secs = 300
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Whether prompts may be shown at all
    pub interactive: Option<bool>,

    /// Per-tool timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout(self.timeout_secs)
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// bin_dir = "vendor/bin"
/// timeout_secs = 120
///
/// [analyzer]
/// memory_limit = "1G"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Directory holding tool binaries, relative to the repository root
    pub bin_dir: Option<String>,

    /// Per-tool timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Analyzer settings
    pub analyzer: Option<AnalyzerConfig>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bin_dir) = &self.bin_dir {
            if bin_dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "bin_dir cannot be empty".to_string(),
                ));
            }
            if Path::new(bin_dir).is_absolute() {
                return Err(ConfigError::InvalidValue(format!(
                    "bin_dir must be relative to the repository root, got '{}'",
                    bin_dir
                )));
            }
        }

        validate_timeout(self.timeout_secs)?;

        if let Some(analyzer) = &self.analyzer {
            analyzer.validate()?;
        }

        Ok(())
    }
}

/// Analyzer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Value passed to `--memory-limit`
    pub memory_limit: Option<String>,
}

impl AnalyzerConfig {
    /// Validate analyzer settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = &self.memory_limit {
            if limit.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "analyzer.memory_limit cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_timeout(timeout_secs: Option<u64>) -> Result<(), ConfigError> {
    if timeout_secs == Some(0) {
        return Err(ConfigError::InvalidValue(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
