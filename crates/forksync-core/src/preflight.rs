// Rust guideline compliant 2026-10-19

//! Preflight checks run before anything in the repository is touched.

use crate::locks;
use crate::settings::SyncSettings;
use crate::vcs::Vcs;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Facts gathered by a successful preflight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preflight {
    /// Branch checked out when the run started; `None` when detached.
    pub original_branch: Option<String>,
    /// Lock files that were removed.
    pub cleared_locks: Vec<PathBuf>,
}

/// Verifies the repository can be synced.
///
/// Checks, in order: remotes, local branches, in-progress operations, lock
/// files. Nothing is modified unless stale lock removal is enabled.
///
/// # Errors
///
/// Returns an error if:
/// - the upstream or fork remote is missing
/// - the primary or development branch does not exist locally
/// - a rebase, merge or similar operation is in progress
/// - lock files are present and cannot be cleared
pub fn run(vcs: &dyn Vcs, settings: &SyncSettings) -> Result<Preflight> {
    let remotes = vcs.remotes()?;
    for name in [&settings.upstream_remote, &settings.fork_remote] {
        if !remotes.iter().any(|r| r == name) {
            return Err(Error::MissingRemote { name: name.clone() });
        }
    }

    let branches = vcs.local_branches()?;
    for name in [&settings.primary_branch, &settings.dev_branch] {
        if !branches.iter().any(|b| b == name) {
            return Err(Error::MissingBranch {
                name: name.clone(),
                available: branches.clone(),
            });
        }
    }

    if let Some(op) = vcs.operation_in_progress()? {
        return Err(Error::Busy(op));
    }

    let found = locks::find_locks(
        vcs.git_dir(),
        vcs.common_dir(),
        &[settings.primary_branch.as_str(), settings.dev_branch.as_str()],
    )?;
    let cleared_locks =
        locks::clear_or_refuse(found, settings.clear_stale_locks, settings.stale_lock_age)?;

    let original_branch = vcs.current_branch()?;
    debug!(original = ?original_branch, "preflight passed");

    Ok(Preflight {
        original_branch,
        cleared_locks,
    })
}
