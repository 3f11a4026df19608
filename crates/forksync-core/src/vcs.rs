// Rust guideline compliant 2026-10-19

//! The version-control seam used by the orchestrator.
//!
//! Everything the pipeline needs from git goes through the [`Vcs`] trait, so the
//! step logic can be exercised against a scripted implementation in tests while
//! [`crate::GitCli`] drives a real repository.

use crate::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A multi-step git operation that leaves the repository in a special state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoOperation {
    /// `git rebase`.
    Rebase,
    /// `git merge`.
    Merge,
    /// `git cherry-pick`.
    CherryPick,
    /// `git revert`.
    Revert,
    /// `git bisect`.
    Bisect,
    /// `git am`.
    ApplyMailbox,
}

impl RepoOperation {
    /// Command that resumes the operation after conflicts are resolved.
    pub fn continue_command(self) -> &'static str {
        match self {
            RepoOperation::Rebase => "git rebase --continue",
            RepoOperation::Merge => "git commit --no-edit",
            RepoOperation::CherryPick => "git cherry-pick --continue",
            RepoOperation::Revert => "git revert --continue",
            RepoOperation::Bisect => "git bisect good|bad",
            RepoOperation::ApplyMailbox => "git am --continue",
        }
    }

    /// Command that abandons the operation.
    pub fn abort_command(self) -> &'static str {
        match self {
            RepoOperation::Rebase => "git rebase --abort",
            RepoOperation::Merge => "git merge --abort",
            RepoOperation::CherryPick => "git cherry-pick --abort",
            RepoOperation::Revert => "git revert --abort",
            RepoOperation::Bisect => "git bisect reset",
            RepoOperation::ApplyMailbox => "git am --abort",
        }
    }
}

impl fmt::Display for RepoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepoOperation::Rebase => "rebase",
            RepoOperation::Merge => "merge",
            RepoOperation::CherryPick => "cherry-pick",
            RepoOperation::Revert => "revert",
            RepoOperation::Bisect => "bisect",
            RepoOperation::ApplyMailbox => "am session",
        };
        f.write_str(name)
    }
}

/// Counts of uncommitted changes in the working tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Entries with staged changes.
    pub staged: usize,
    /// Tracked entries modified, deleted or conflicted in the working tree.
    pub modified: usize,
    /// Untracked, non-ignored entries.
    pub untracked: usize,
}

impl WorktreeStatus {
    /// Returns whether anything would need to be held aside.
    pub fn has_changes(&self, include_untracked: bool) -> bool {
        self.staged > 0 || self.modified > 0 || (include_untracked && self.untracked > 0)
    }
}

/// One entry of the stash list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    /// Reference such as `stash@{0}`.
    pub reference: String,
    /// Subject line, e.g. `On main: forksync-autostash ...`.
    pub message: String,
}

/// Result of an operation that may stop on conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    /// Completed without conflicts.
    Clean,
    /// Stopped on conflicts; git's own state was left for manual resolution.
    Conflicted,
}

/// How a branch is pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMode {
    /// Plain push; the remote refuses anything but a fast-forward.
    FastForward,
    /// Force push guarded by a lease on the remote's current value.
    ///
    /// `None` means the branch is expected not to exist on the remote yet.
    Lease {
        /// Commit the remote branch must still point to.
        expected: Option<String>,
    },
}

/// Version-control operations consumed by the sync pipeline.
///
/// Revisions are passed as anything git can resolve (full ref names are used by
/// the pipeline). Commit ids are returned as hex strings.
pub trait Vcs {
    /// Root of the working tree.
    fn workdir(&self) -> &Path;

    /// Per-worktree git directory (holds `index.lock`, `HEAD.lock`).
    fn git_dir(&self) -> &Path;

    /// Shared git directory (holds refs and `packed-refs`).
    fn common_dir(&self) -> &Path;

    /// Names of configured remotes.
    fn remotes(&self) -> Result<Vec<String>>;

    /// Names of local branches.
    fn local_branches(&self) -> Result<Vec<String>>;

    /// Checked-out branch, or `None` when HEAD is detached or unborn.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Multi-step operation currently in progress, if any.
    fn operation_in_progress(&self) -> Result<Option<RepoOperation>>;

    /// Summary of uncommitted changes.
    fn worktree_status(&self) -> Result<WorktreeStatus>;

    /// Resolves a revision to a commit id, `None` if it does not exist.
    fn resolve(&self, rev: &str) -> Result<Option<String>>;

    /// Returns whether `ancestor` is equal to or reachable from `descendant`.
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Number of commits reachable from `to` but not from `from`.
    fn count_commits(&self, from: &str, to: &str) -> Result<usize>;

    /// Stashes local changes under `message`.
    fn stash_push(&self, message: &str, include_untracked: bool) -> Result<()>;

    /// Lists stash entries, newest first.
    fn stash_list(&self) -> Result<Vec<StashEntry>>;

    /// Applies and drops a stash entry; on conflict the entry is kept.
    fn stash_pop(&self, reference: &str) -> Result<Integration>;

    /// Fetches `branch` from `remote` into `refs/remotes/<remote>/<branch>`.
    ///
    /// Returns `false` when the remote has no such branch.
    fn fetch(&self, remote: &str, branch: &str) -> Result<bool>;

    /// Switches the working tree to a local branch.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Abandons an in-progress operation.
    fn abort(&self, operation: RepoOperation) -> Result<()>;

    /// Rebases the current branch onto `onto`.
    fn rebase(&self, onto: &str) -> Result<Integration>;

    /// Merges `rev` into the current branch without opening an editor.
    fn merge(&self, rev: &str) -> Result<Integration>;

    /// Pushes a local branch to the same name on `remote`.
    fn push(&self, remote: &str, branch: &str, mode: &PushMode) -> Result<()>;
}

/// Full name of a local branch ref.
pub fn local_ref(branch: &str) -> String {
    format!("refs/heads/{}", branch)
}

/// Full name of a remote-tracking ref.
pub fn tracking_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{}/{}", remote, branch)
}
