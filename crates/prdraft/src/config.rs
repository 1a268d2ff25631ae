//! Configuration file support for prdraft.
//!
//! Settings come from `prdraft.toml` in the repository, then from
//! `<config dir>/prdraft/config.toml` for the user. Command-line flags
//! override both.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from `prdraft.toml`
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Agent used to write the description (claude, opencode, cursor)
    pub agent: Option<String>,
    /// Agent binary to run instead of the one on PATH
    pub agent_path: Option<PathBuf>,
    /// Model to use (if agent supports it)
    pub model: Option<String>,
    /// Base branch used when none is given on the command line
    pub base_branch: Option<String>,
    /// Remote whose HEAD names the default branch
    pub remote: Option<String>,
    /// Agent timeout, e.g. "90s" or "5m"
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    /// Diffs longer than this are cut before they reach the agent
    pub max_diff_bytes: Option<usize>,
}

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "prdraft.toml";

/// Base branch used when neither the command line nor a config file names one
pub const DEFAULT_BASE_BRANCH: &str = "main";

impl ProjectConfig {
    /// Load `prdraft.toml` from the repository directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(repo_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&repo_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the per-user config file, if the platform has a config directory
    pub fn load_user() -> Result<Option<Self>> {
        match Self::user_config_path() {
            Some(path) => Self::load_file(&path),
            None => Ok(None),
        }
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prdraft").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Fill fields unset here from `fallback`
    pub fn or(self, fallback: ProjectConfig) -> ProjectConfig {
        ProjectConfig {
            agent: self.agent.or(fallback.agent),
            agent_path: self.agent_path.or(fallback.agent_path),
            model: self.model.or(fallback.model),
            base_branch: self.base_branch.or(fallback.base_branch),
            remote: self.remote.or(fallback.remote),
            timeout: self.timeout.or(fallback.timeout),
            max_diff_bytes: self.max_diff_bytes.or(fallback.max_diff_bytes),
        }
    }

    /// Base branch to request from the extractor.
    ///
    /// `None` asks the extractor to detect it.
    /// Priority: detect flag > --base-branch > config > "main"
    pub fn base_branch_for(&self, cli_base: Option<&str>, detect: bool) -> Option<String> {
        if detect {
            return None;
        }
        Some(
            cli_base
                .or(self.base_branch.as_deref())
                .unwrap_or(DEFAULT_BASE_BRANCH)
                .to_string(),
        )
    }
}
