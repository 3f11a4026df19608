// Rust guideline compliant 2026-10-19

//! Error types for the forksync core library.

use crate::vcs::RepoOperation;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for forksync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure, used for exit codes and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Not a repository, missing remote or branch.
    Environment,
    /// An operation is already in progress or lock files are present.
    Busy,
    /// Local changes could not be held aside.
    Stash,
    /// A rebase or merge stopped on conflicts.
    Conflict,
    /// A push was refused.
    PushRejected,
    /// Invalid configuration.
    Config,
    /// Any other git or IO failure.
    Git,
}

impl FailureKind {
    /// Returns the process exit code for this kind of failure.
    pub fn exit_code(self) -> i32 {
        match self {
            FailureKind::Git => 1,
            FailureKind::Environment => 2,
            FailureKind::Busy => 3,
            FailureKind::Stash => 4,
            FailureKind::Conflict => 5,
            FailureKind::PushRejected => 6,
            FailureKind::Config => 7,
        }
    }
}

/// Error types for forksync operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// libgit2 reported an error while reading repository state.
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// The directory is not inside a git repository.
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// The repository has no working tree.
    #[error("Repository at {} has no working tree", .0.display())]
    BareRepository(PathBuf),

    /// A required remote is not configured.
    #[error("Remote '{name}' is not configured")]
    MissingRemote {
        /// Remote name.
        name: String,
    },

    /// A required local branch does not exist.
    #[error("Branch '{name}' does not exist locally (available: {})", .available.join(", "))]
    MissingBranch {
        /// Branch name.
        name: String,
        /// Local branches that do exist.
        available: Vec<String>,
    },

    /// The upstream remote does not carry the tracked branch.
    #[error("Remote '{remote}' has no branch '{branch}'")]
    MissingUpstreamBranch {
        /// Remote name.
        remote: String,
        /// Branch name.
        branch: String,
    },

    /// Another git operation is still in progress.
    #[error("Repository is busy: a {0} is already in progress")]
    Busy(RepoOperation),

    /// Lock files left behind by another git process.
    #[error("Lock files present: {}", display_paths(.0))]
    StaleLocks(Vec<PathBuf>),

    /// Local changes could not be moved out of the way.
    #[error("Could not hold aside local changes: {0}")]
    HoldFailed(String),

    /// A rebase stopped on conflicts and was left open.
    #[error("Rebase of '{branch}' onto '{onto}' stopped on conflicts")]
    RebaseConflict {
        /// Branch being rebased.
        branch: String,
        /// Rebase target.
        onto: String,
    },

    /// The operator resumed, but the rebase was not finished.
    #[error("Rebase of '{branch}' is still in progress")]
    RebaseUnfinished {
        /// Branch being rebased.
        branch: String,
    },

    /// The operator resumed, but the rebase had been aborted instead of finished.
    #[error("Rebase of '{branch}' was aborted before '{onto}' was integrated")]
    RebaseAbandoned {
        /// Branch being rebased.
        branch: String,
        /// Rebase target.
        onto: String,
    },

    /// A merge stopped on conflicts and was left open.
    #[error("Merge of '{from}' into '{branch}' stopped on conflicts")]
    MergeConflict {
        /// Branch receiving the merge.
        branch: String,
        /// Merged revision.
        from: String,
    },

    /// Switching branches failed even after recovery.
    #[error("Could not switch to branch '{branch}': {detail}")]
    CheckoutFailed {
        /// Target branch.
        branch: String,
        /// Git's explanation.
        detail: String,
    },

    /// Fetching from a remote failed.
    #[error("Fetch from '{remote}' failed: {detail}")]
    FetchFailed {
        /// Remote name.
        remote: String,
        /// Git's explanation.
        detail: String,
    },

    /// The remote refused a push.
    #[error("Push of '{branch}' to '{remote}' rejected: {detail}")]
    PushRejected {
        /// Remote name.
        remote: String,
        /// Branch name.
        branch: String,
        /// Git's explanation.
        detail: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A git invocation failed unexpectedly.
    #[error("git {args} failed: {detail}")]
    Command {
        /// Arguments passed to git.
        args: String,
        /// Git's explanation.
        detail: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Returns the failure classification for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::NotARepository(_)
            | Error::BareRepository(_)
            | Error::MissingRemote { .. }
            | Error::MissingBranch { .. }
            | Error::MissingUpstreamBranch { .. } => FailureKind::Environment,
            Error::Busy(_) | Error::StaleLocks(_) => FailureKind::Busy,
            Error::HoldFailed(_) => FailureKind::Stash,
            Error::RebaseConflict { .. }
            | Error::RebaseUnfinished { .. }
            | Error::RebaseAbandoned { .. }
            | Error::MergeConflict { .. } => FailureKind::Conflict,
            Error::PushRejected { .. } => FailureKind::PushRejected,
            Error::Config(_) => FailureKind::Config,
            Error::Io(_)
            | Error::Git2(_)
            | Error::CheckoutFailed { .. }
            | Error::FetchFailed { .. }
            | Error::Command { .. } => FailureKind::Git,
        }
    }

    /// Returns concrete next actions for the operator.
    ///
    /// Every line is either a command to run or a short instruction.
    pub fn remedy(&self) -> Vec<String> {
        match self {
            Error::NotARepository(_) => {
                vec!["Run forksync from inside a clone of your fork, or pass -C <path>".to_string()]
            }
            Error::BareRepository(_) => {
                vec!["Run forksync from a clone that has a working tree".to_string()]
            }
            Error::MissingRemote { name } => vec![
                format!("git remote add {} <url>", name),
                "git remote -v   # to review configured remotes".to_string(),
            ],
            Error::MissingBranch { name, available } => {
                let mut lines = vec![format!(
                    "Create it with: git branch {} <start-point>, or pass an existing branch name",
                    name
                )];
                if !available.is_empty() {
                    lines.push(format!("Existing branches: {}", available.join(", ")));
                }
                lines
            }
            Error::MissingUpstreamBranch { remote, branch } => vec![
                format!("git ls-remote --heads {}   # to list its branches", remote),
                format!(
                    "Set FORKSYNC_UPSTREAM_BRANCH if '{}' is not the mainline",
                    branch
                ),
            ],
            Error::Busy(op) => vec![
                format!("Finish it with: {}", op.continue_command()),
                format!("Or abandon it with: {}", op.abort_command()),
            ],
            Error::StaleLocks(paths) => {
                let mut lines = vec![
                    "Make sure no other git process is running, then remove:".to_string(),
                ];
                lines.extend(paths.iter().map(|p| format!("rm {}", p.display())));
                lines.push("Or re-run with --clear-stale-locks".to_string());
                lines
            }
            Error::HoldFailed(_) => vec![
                "Commit or stash your changes manually, then re-run".to_string(),
                "git status   # to inspect the working tree".to_string(),
            ],
            Error::RebaseConflict { .. } | Error::RebaseUnfinished { .. } => vec![
                "Resolve the conflicted files, then: git add <files>".to_string(),
                "git rebase --continue   # repeat until the rebase completes".to_string(),
                "git rebase --abort      # to give up and restore the branch".to_string(),
                "Re-run forksync once the rebase is finished".to_string(),
            ],
            Error::RebaseAbandoned { branch, onto } => vec![
                format!("git log --oneline {}..{}   # commits still to integrate", branch, onto),
                "Re-run forksync to start the integration again".to_string(),
            ],
            Error::MergeConflict { .. } => vec![
                "Resolve the conflicted files, then: git add <files>".to_string(),
                "git commit --no-edit   # to conclude the merge".to_string(),
                "git merge --abort      # to give up".to_string(),
                "Re-run forksync once the merge is concluded".to_string(),
            ],
            Error::CheckoutFailed { branch, .. } => vec![
                "git status   # look for files blocking the switch".to_string(),
                format!("git switch {}", branch),
            ],
            Error::FetchFailed { remote, .. } => vec![
                format!("git fetch {}   # check connectivity and credentials", remote),
            ],
            Error::PushRejected { remote, branch, .. } => vec![
                format!("git pull --rebase {} {}", remote, branch),
                "Re-run forksync after integrating the remote commits".to_string(),
            ],
            Error::Config(_) => {
                vec!["Check .git/forksync.toml and FORKSYNC_* environment variables".to_string()]
            }
            Error::Io(_) | Error::Git2(_) | Error::Command { .. } => {
                vec!["git status   # inspect the repository before retrying".to_string()]
            }
        }
    }
}
