//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! There are two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$QUALITY_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/quality/config.toml`
//! 3. `~/.quality/config.toml`
//!
//! # Repo Config Location
//!
//! `<git common dir>/quality/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use quality_hook::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! println!("Tools live in {}", config.bin_dir());
//! println!("Analyzer memory limit: {}", config.memory_limit());
//! ```

pub mod schema;

pub use schema::{AnalyzerConfig, GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default directory holding tool binaries, relative to the repository root.
pub const DEFAULT_BIN_DIR: &str = "vendor/bin";

/// Default analyzer memory limit.
pub const DEFAULT_MEMORY_LIMIT: &str = "2048M";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence automatically: repo config overrides
/// global config, which overrides built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if present)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, the repo config under it is loaded too.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. Missing files fall back to defaults.
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = match Self::global_config_location() {
            Some(path) => (Some(Self::read_config::<GlobalConfig>(&path)?), Some(path)),
            None => (None, None),
        };

        let (repo, repo_path) = match git_dir.map(Self::repo_config_path) {
            Some(path) if path.is_file() => {
                (Some(Self::read_config::<RepoConfig>(&path)?), Some(path))
            }
            _ => (None, None),
        };

        let config = Config {
            global: global.unwrap_or_default(),
            repo,
            global_path,
            repo_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Find the first existing global config file.
    fn global_config_location() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("QUALITY_CONFIG") {
            let path = PathBuf::from(path);
            if path.is_file() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("quality/config.toml");
            if path.is_file() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".quality/config.toml"))
            .filter(|path| path.is_file())
    }

    /// Get the canonical path for repo config.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("quality/config.toml")
    }

    /// Read and parse a config file.
    fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.global.validate()?;
        if let Some(repo) = &self.repo {
            repo.validate()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Directory holding tool binaries, relative to the repository root.
    ///
    /// Defaults to `vendor/bin`.
    pub fn bin_dir(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.bin_dir.as_deref())
            .unwrap_or(DEFAULT_BIN_DIR)
    }

    /// Per-tool timeout.
    ///
    /// Defaults to no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.repo
            .as_ref()
            .and_then(|r| r.timeout_secs)
            .or(self.global.timeout_secs)
            .map(Duration::from_secs)
    }

    /// Analyzer memory limit.
    ///
    /// Defaults to `2048M`.
    pub fn memory_limit(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.analyzer.as_ref())
            .and_then(|a| a.memory_limit.as_deref())
            .unwrap_or(DEFAULT_MEMORY_LIMIT)
    }

    /// Whether prompts may be shown.
    ///
    /// Defaults to `true`.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_repo_config(contents: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("quality");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), contents).unwrap();
        temp
    }

    #[test]
    fn defaults_without_files() {
        let config = Config::default();

        assert_eq!(config.bin_dir(), "vendor/bin");
        assert_eq!(config.memory_limit(), "2048M");
        assert_eq!(config.timeout(), None);
        assert!(config.interactive());
    }

    #[test]
    fn load_repo_config() {
        let temp = write_repo_config(
            r#"
            bin_dir = "tools/bin"
            timeout_secs = 30

            [analyzer]
            memory_limit = "1G"
            "#,
        );

        let config = Config::load(Some(temp.path())).unwrap();

        assert_eq!(config.bin_dir(), "tools/bin");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.memory_limit(), "1G");
        assert_eq!(
            config.repo_config_loaded_from(),
            Some(temp.path().join("quality/config.toml").as_path())
        );
    }

    #[test]
    fn missing_repo_config_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(temp.path())).unwrap();
        assert!(config.repo.is_none());
        assert!(config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn malformed_repo_config_is_parse_error() {
        let temp = write_repo_config("bin_dir = [");
        let err = Config::load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_repo_value_rejected() {
        let temp = write_repo_config("timeout_secs = 0");
        let err = Config::load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn repo_timeout_overrides_global() {
        let config = Config {
            global: GlobalConfig {
                timeout_secs: Some(600),
                ..Default::default()
            },
            repo: Some(RepoConfig {
                timeout_secs: Some(10),
                ..Default::default()
            }),
            global_path: None,
            repo_path: None,
        };

        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn global_timeout_used_when_repo_silent() {
        let config = Config {
            global: GlobalConfig {
                timeout_secs: Some(600),
                interactive: Some(false),
            },
            repo: Some(RepoConfig::default()),
            global_path: None,
            repo_path: None,
        };

        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
        assert!(!config.interactive());
    }
}
