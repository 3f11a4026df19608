// Rust guideline compliant 2026-10-19

//! Configuration management for forksync.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the per-repository configuration, stored in the git directory.
pub const CONFIG_FILE: &str = "forksync.toml";

/// How the development branch picks up the primary branch's commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationPolicy {
    /// Rebase the development branch onto the primary branch.
    #[default]
    Rebase,
    /// Merge the primary branch into the development branch.
    Merge,
}

/// Configuration for forksync behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote that tracks the original repository.
    #[serde(default = "default_upstream_remote")]
    pub upstream_remote: String,

    /// Mainline branch on the upstream remote.
    #[serde(default = "default_main_branch")]
    pub upstream_branch: String,

    /// Remote that holds the user's fork.
    #[serde(default = "default_fork_remote")]
    pub fork_remote: String,

    /// Local branch mirroring the upstream mainline.
    #[serde(default = "default_main_branch")]
    pub primary_branch: String,

    /// Development branch synced when no branch is given on the command line.
    #[serde(default = "default_dev_branch")]
    pub dev_branch: String,

    /// How the development branch is updated.
    #[serde(default)]
    pub integration: IntegrationPolicy,

    /// Whether untracked files are held aside along with tracked changes.
    #[serde(default = "default_true")]
    pub include_untracked: bool,

    /// Whether to switch back to the branch that was checked out before the run.
    #[serde(default = "default_true")]
    pub return_to_original: bool,

    /// Whether the primary branch is pushed to the fork.
    #[serde(default = "default_true")]
    pub push_primary: bool,

    /// Whether lock files older than `stale_lock_age_secs` are removed automatically.
    #[serde(default)]
    pub clear_stale_locks: bool,

    /// Minimum age of a lock file before it is considered stale.
    #[serde(default = "default_stale_lock_age")]
    pub stale_lock_age_secs: u64,

    /// How long a non-interactive run waits for a conflicted rebase to be finished.
    #[serde(default)]
    pub pause_timeout_secs: Option<u64>,
}

fn default_upstream_remote() -> String {
    "upstream".to_string()
}

fn default_fork_remote() -> String {
    "origin".to_string()
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_dev_branch() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

fn default_stale_lock_age() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_remote: default_upstream_remote(),
            upstream_branch: default_main_branch(),
            fork_remote: default_fork_remote(),
            primary_branch: default_main_branch(),
            dev_branch: default_dev_branch(),
            integration: IntegrationPolicy::default(),
            include_untracked: true,
            return_to_original: true,
            push_primary: true,
            clear_stale_locks: false,
            stale_lock_age_secs: default_stale_lock_age(),
            pause_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads configuration from the git directory and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `<git-dir>/forksync.toml`, if present
    /// 3. Environment variables with `FORKSYNC_` prefix
    ///
    /// # Arguments
    ///
    /// * `git_dir` - Path to the repository's git directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(git_dir: &Path) -> Result<Self> {
        let config_path = git_dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            Self::read_file(&config_path)?
        } else {
            Self::default()
        };
        config.finish()
    }

    /// Loads configuration from an explicit file, then applies environment overrides.
    ///
    /// Unlike [`Config::load`], a missing file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::read_file(path)?.finish()
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    fn finish(mut self) -> Result<Self> {
        self.apply_env_overrides()?;
        self.validate()?;
        Ok(self)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FORKSYNC_UPSTREAM_REMOTE` - Upstream remote name
    /// - `FORKSYNC_UPSTREAM_BRANCH` - Upstream mainline branch
    /// - `FORKSYNC_DEV_BRANCH` - Default development branch
    /// - `FORKSYNC_FORK_REMOTE` - Fork remote name
    /// - `FORKSYNC_PRIMARY_BRANCH` - Local primary branch
    /// - `FORKSYNC_INTEGRATION` - `rebase` or `merge`
    /// - `FORKSYNC_INCLUDE_UNTRACKED` - Hold aside untracked files (true/false)
    /// - `FORKSYNC_PAUSE_TIMEOUT_SECS` - Non-interactive conflict wait in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values are invalid.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("FORKSYNC_UPSTREAM_REMOTE") {
            self.upstream_remote = val;
        }

        if let Ok(val) = std::env::var("FORKSYNC_UPSTREAM_BRANCH") {
            self.upstream_branch = val;
        }

        if let Ok(val) = std::env::var("FORKSYNC_DEV_BRANCH") {
            self.dev_branch = val;
        }

        if let Ok(val) = std::env::var("FORKSYNC_FORK_REMOTE") {
            self.fork_remote = val;
        }

        if let Ok(val) = std::env::var("FORKSYNC_PRIMARY_BRANCH") {
            self.primary_branch = val;
        }

        if let Ok(val) = std::env::var("FORKSYNC_INTEGRATION") {
            self.integration = match val.as_str() {
                "rebase" => IntegrationPolicy::Rebase,
                "merge" => IntegrationPolicy::Merge,
                _ => {
                    return Err(Error::Config(
                        "FORKSYNC_INTEGRATION must be rebase or merge".to_string(),
                    ))
                }
            };
        }

        if let Ok(val) = std::env::var("FORKSYNC_INCLUDE_UNTRACKED") {
            self.include_untracked = val.parse().map_err(|_| {
                Error::Config("FORKSYNC_INCLUDE_UNTRACKED must be true or false".to_string())
            })?;
        }

        if let Ok(val) = std::env::var("FORKSYNC_PAUSE_TIMEOUT_SECS") {
            let secs: u64 = val.parse().map_err(|_| {
                Error::Config("FORKSYNC_PAUSE_TIMEOUT_SECS must be a number of seconds".to_string())
            })?;
            self.pause_timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a remote or branch name is empty or contains whitespace
    /// - the primary and development branches are the same
    /// - stale_lock_age_secs is zero
    fn validate(&self) -> Result<()> {
        let names = [
            ("upstream_remote", &self.upstream_remote),
            ("upstream_branch", &self.upstream_branch),
            ("fork_remote", &self.fork_remote),
            ("primary_branch", &self.primary_branch),
            ("dev_branch", &self.dev_branch),
        ];
        for (field, value) in names {
            validate_name(field, value)?;
        }

        if self.primary_branch == self.dev_branch {
            return Err(Error::Config(format!(
                "dev_branch must differ from primary_branch ('{}')",
                self.primary_branch
            )));
        }

        if self.stale_lock_age_secs == 0 {
            return Err(Error::Config(
                "stale_lock_age_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checks that a remote or branch name is usable on a git command line.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", field)));
    }
    if value.chars().any(char::is_whitespace) || value.starts_with('-') {
        return Err(Error::Config(format!(
            "{} '{}' is not a valid name",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all_env_vars() {
        for var in [
            "FORKSYNC_UPSTREAM_REMOTE",
            "FORKSYNC_UPSTREAM_BRANCH",
            "FORKSYNC_DEV_BRANCH",
            "FORKSYNC_FORK_REMOTE",
            "FORKSYNC_PRIMARY_BRANCH",
            "FORKSYNC_INTEGRATION",
            "FORKSYNC_INCLUDE_UNTRACKED",
            "FORKSYNC_PAUSE_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream_remote, "upstream");
        assert_eq!(config.upstream_branch, "main");
        assert_eq!(config.fork_remote, "origin");
        assert_eq!(config.primary_branch, "main");
        assert_eq!(config.dev_branch, "dev");
        assert_eq!(config.integration, IntegrationPolicy::Rebase);
        assert!(config.include_untracked);
        assert!(config.return_to_original);
        assert_eq!(config.pause_timeout_secs, None);
    }

    #[test]
    fn test_config_load_missing_file() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.dev_branch, "dev");
        assert_eq!(config.stale_lock_age_secs, 60);
    }

    #[test]
    fn test_config_load_from_file() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let content = r#"
upstream_remote = "source"
upstream_branch = "trunk"
dev_branch = "feature"
integration = "merge"
include_untracked = false
pause_timeout_secs = 120
"#;
        std::fs::write(temp_dir.path().join(CONFIG_FILE), content).unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.upstream_remote, "source");
        assert_eq!(config.upstream_branch, "trunk");
        assert_eq!(config.dev_branch, "feature");
        assert_eq!(config.integration, IntegrationPolicy::Merge);
        assert!(!config.include_untracked);
        assert_eq!(config.pause_timeout_secs, Some(120));
        assert_eq!(config.fork_remote, "origin");
    }

    #[test]
    fn test_config_load_from_missing_explicit_file() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_invalid_toml() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "dev_branch = [").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_validation_same_branches() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "dev_branch = \"main\"").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_validation_zero_lock_age() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "stale_lock_age_secs = 0").unwrap();
        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_env_override_names() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("FORKSYNC_UPSTREAM_REMOTE", "source");
        std::env::set_var("FORKSYNC_UPSTREAM_BRANCH", "master");
        std::env::set_var("FORKSYNC_DEV_BRANCH", "work");
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.upstream_remote, "source");
        assert_eq!(config.upstream_branch, "master");
        assert_eq!(config.dev_branch, "work");

        clear_all_env_vars();
    }

    #[test]
    fn test_config_file_overridden_by_env() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "integration = \"merge\"").unwrap();

        std::env::set_var("FORKSYNC_INTEGRATION", "rebase");
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.integration, IntegrationPolicy::Rebase);

        clear_all_env_vars();
    }

    #[test]
    fn test_config_env_invalid_integration() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("FORKSYNC_INTEGRATION", "squash");
        assert!(Config::load(temp_dir.path()).is_err());

        clear_all_env_vars();
    }

    #[test]
    fn test_config_env_invalid_timeout() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("FORKSYNC_PAUSE_TIMEOUT_SECS", "soon");
        assert!(Config::load(temp_dir.path()).is_err());

        clear_all_env_vars();
    }

    #[test]
    fn test_config_env_empty_name_rejected() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("FORKSYNC_FORK_REMOTE", "");
        assert!(Config::load(temp_dir.path()).is_err());

        clear_all_env_vars();
    }

    #[test]
    fn test_validate_name_rejects_option_like_values() {
        assert!(validate_name("dev_branch", "--force").is_err());
        assert!(validate_name("dev_branch", "my branch").is_err());
        assert!(validate_name("dev_branch", "feature/x").is_ok());
    }
}
