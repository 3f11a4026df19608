// Rust guideline compliant 2026-10-19

//! Immutable run settings resolved once before the pipeline starts.

use crate::config::{validate_name, Config, IntegrationPolicy};
use crate::{Error, Result};
use std::time::Duration;

/// Which pushes the run may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushPolicy {
    /// Master switch; when false nothing is pushed anywhere.
    pub enabled: bool,
    /// Whether the primary branch is pushed.
    pub primary: bool,
    /// Whether the primary push may rewrite history under a lease.
    pub primary_lease: bool,
}

impl PushPolicy {
    /// Returns whether the primary branch will actually be pushed.
    pub fn pushes_primary(&self) -> bool {
        self.enabled && self.primary
    }
}

/// Command-line choices layered over the loaded [`Config`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Development branch given on the command line.
    pub dev_branch: Option<String>,
    /// Disable all pushing.
    pub no_push: bool,
    /// Disable pushing the primary branch only.
    pub no_push_primary: bool,
    /// Allow a lease-guarded force push of the primary branch.
    pub force_primary: bool,
    /// Merge instead of rebase.
    pub merge: bool,
    /// Leave untracked files in place.
    pub no_untracked: bool,
    /// Stay on the development branch when done.
    pub stay: bool,
    /// Remove old lock files instead of refusing.
    pub clear_stale_locks: bool,
    /// Non-interactive conflict wait.
    pub pause_timeout_secs: Option<u64>,
}

/// Run configuration shared read-only by every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Remote tracking the original repository.
    pub upstream_remote: String,
    /// Mainline branch on the upstream remote.
    pub upstream_branch: String,
    /// The user's fork.
    pub fork_remote: String,
    /// Local mirror of the upstream mainline.
    pub primary_branch: String,
    /// Development branch receiving the primary branch's updates.
    pub dev_branch: String,
    /// Push behaviour.
    pub push: PushPolicy,
    /// How the development branch is updated.
    pub integration: IntegrationPolicy,
    /// Whether untracked files are held aside.
    pub include_untracked: bool,
    /// Whether to switch back to the starting branch.
    pub return_to_original: bool,
    /// Whether stale lock files are removed.
    pub clear_stale_locks: bool,
    /// Minimum age before a lock file counts as stale.
    pub stale_lock_age: Duration,
    /// Non-interactive conflict wait; `None` means fail immediately.
    pub pause_timeout: Option<Duration>,
}

impl SyncSettings {
    /// Folds command-line overrides into the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the overridden development branch is invalid or equals
    /// the primary branch.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self> {
        let dev_branch = overrides
            .dev_branch
            .clone()
            .unwrap_or_else(|| config.dev_branch.clone());
        validate_name("dev branch", &dev_branch)?;
        if dev_branch == config.primary_branch {
            return Err(Error::Config(format!(
                "the development branch cannot be the primary branch '{}'",
                dev_branch
            )));
        }

        let integration = if overrides.merge {
            IntegrationPolicy::Merge
        } else {
            config.integration
        };

        Ok(Self {
            upstream_remote: config.upstream_remote.clone(),
            upstream_branch: config.upstream_branch.clone(),
            fork_remote: config.fork_remote.clone(),
            primary_branch: config.primary_branch.clone(),
            dev_branch,
            push: PushPolicy {
                enabled: !overrides.no_push,
                primary: config.push_primary && !overrides.no_push_primary,
                primary_lease: overrides.force_primary,
            },
            integration,
            include_untracked: config.include_untracked && !overrides.no_untracked,
            return_to_original: config.return_to_original && !overrides.stay,
            clear_stale_locks: config.clear_stale_locks || overrides.clear_stale_locks,
            stale_lock_age: Duration::from_secs(config.stale_lock_age_secs),
            pause_timeout: overrides
                .pause_timeout_secs
                .or(config.pause_timeout_secs)
                .map(Duration::from_secs),
        })
    }
}
