//! BranchWatch configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::WatchTarget;
use crate::error::WatchError;

/// Environment variable that overrides the configured branch
pub const BRANCH_ENV: &str = "TARGET_BRANCH";

/// Project-local config file, searched before the user config directory
const LOCAL_CONFIG: &str = ".branchwatch.yml";

/// Main BranchWatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Account or organisation owning the repository
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch to watch
    pub branch: String,

    /// Environment variable containing the access token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// API base URL
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Directory holding one cursor file per (repository, branch)
    #[serde(rename = "tracking-dir")]
    pub tracking_dir: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: "favour-nz".to_string(),
            repo: "foodme-app".to_string(),
            branch: "dev".to_string(),
            token_env: "FOODME_TOKEN".to_string(),
            api_url: "https://api.github.com".to_string(),
            timeout_ms: crate::DEFAULT_TIMEOUT_MS,
            tracking_dir: PathBuf::from("tracking"),
            log_level: None,
        }
    }
}

/// Command-line overrides for the watch target
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

/// Configuration with the credential read and the target fixed
///
/// Built once at startup and handed by reference to the client and detector.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub target: WatchTarget,
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
    pub tracking_dir: PathBuf,
}

impl Config {
    /// Config files to try, in priority order
    ///
    /// An explicit path replaces the search. Otherwise the project-local
    /// `.branchwatch.yml` wins over `<config_dir>/branchwatch/branchwatch.yml`.
    fn candidate_paths(config_path: Option<&PathBuf>) -> Vec<PathBuf> {
        match config_path {
            Some(path) => vec![path.clone()],
            None => [
                Some(PathBuf::from(LOCAL_CONFIG)),
                dirs::config_dir().map(|d| d.join("branchwatch").join("branchwatch.yml")),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Searched files that fail to parse are
    /// skipped with a warning, and defaults apply when none is usable.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        for path in Self::candidate_paths(config_path) {
            if config_path.is_none() && !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) if config_path.is_some() => {
                    return Err(e).context(format!("Failed to load config from {}", path.display()));
                }
                Err(e) => warn!("Failed to load config from {}: {}", path.display(), e),
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::candidate_paths(config_path)
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply the `TARGET_BRANCH` environment override, then CLI flags
    pub fn with_overrides(mut self, overrides: &TargetOverrides) -> Self {
        debug!(?overrides, "with_overrides: called");
        if let Ok(branch) = std::env::var(BRANCH_ENV)
            && !branch.trim().is_empty()
        {
            debug!(%branch, "with_overrides: branch from environment");
            self.branch = branch.trim().to_string();
        }
        if let Some(owner) = &overrides.owner {
            self.owner = owner.clone();
        }
        if let Some(repo) = &overrides.repo {
            self.repo = repo.clone();
        }
        if let Some(branch) = &overrides.branch {
            self.branch = branch.clone();
        }
        self
    }

    /// The watch target described by this config
    ///
    /// Every command that names a target goes through here, so an empty
    /// owner, repo or branch is rejected the same way everywhere.
    pub fn target(&self) -> Result<WatchTarget, WatchError> {
        for (name, value) in [("owner", &self.owner), ("repo", &self.repo), ("branch", &self.branch)] {
            if value.trim().is_empty() {
                return Err(WatchError::Config(format!("{} must not be empty", name)));
            }
        }
        Ok(WatchTarget::new(&self.owner, &self.repo, &self.branch))
    }

    /// Read the access token from the configured environment variable
    pub fn get_token(&self) -> Result<String, WatchError> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(WatchError::Config(format!(
                "{} is missing. Set the {} environment variable.",
                self.token_env, self.token_env
            ))),
        }
    }

    /// Validate and resolve into the values the watcher runs with
    ///
    /// Fails with `WatchError::Config` before any network activity when the
    /// token or target is missing.
    pub fn resolve(&self) -> Result<ResolvedConfig, WatchError> {
        debug!("resolve: called");
        let target = self.target()?;
        if self.timeout_ms == 0 {
            return Err(WatchError::Config("timeout-ms must be greater than zero".to_string()));
        }

        let token = self.get_token()?;

        Ok(ResolvedConfig {
            target,
            token,
            api_url: self.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(self.timeout_ms),
            tracking_dir: self.tracking_dir.clone(),
        })
    }
}
