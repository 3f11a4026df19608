// Rust guideline compliant 2026-10-19

//! Detection and optional cleanup of lock files left by an interrupted git process.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

const WORKTREE_LOCKS: [&str; 3] = ["index.lock", "HEAD.lock", "ORIG_HEAD.lock"];
const COMMON_LOCKS: [&str; 2] = ["config.lock", "packed-refs.lock"];

/// A lock file found in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFile {
    /// Location of the lock.
    pub path: PathBuf,
    /// Time since last modification; `None` if the clock or metadata disagreed.
    pub age: Option<Duration>,
}

/// Lists lock files that would block the sync.
///
/// # Arguments
///
/// * `git_dir` - Per-worktree git directory
/// * `common_dir` - Shared git directory
/// * `branches` - Local branches whose ref locks are checked
///
/// # Errors
///
/// Returns an error if file metadata cannot be read.
pub fn find_locks(git_dir: &Path, common_dir: &Path, branches: &[&str]) -> Result<Vec<LockFile>> {
    let mut candidates: Vec<PathBuf> = WORKTREE_LOCKS.iter().map(|n| git_dir.join(n)).collect();
    candidates.extend(COMMON_LOCKS.iter().map(|n| common_dir.join(n)));
    candidates.extend(
        branches
            .iter()
            .map(|b| common_dir.join("refs").join("heads").join(format!("{}.lock", b))),
    );
    candidates.sort();
    candidates.dedup();

    let now = SystemTime::now();
    let mut found = Vec::new();
    for path in candidates {
        if !path.exists() {
            continue;
        }
        let modified = std::fs::metadata(&path)?.modified()?;
        found.push(LockFile {
            age: now.duration_since(modified).ok(),
            path,
        });
    }
    Ok(found)
}

/// Refuses to continue on lock files, or removes the old ones when allowed.
///
/// With `clear` set, locks at least `min_age` old are deleted; younger locks may
/// belong to a live git process and still block the run.
///
/// # Returns
///
/// The paths that were removed.
///
/// # Errors
///
/// Returns [`Error::StaleLocks`] listing every lock that remains, or an IO
/// error if removal fails.
pub fn clear_or_refuse(locks: Vec<LockFile>, clear: bool, min_age: Duration) -> Result<Vec<PathBuf>> {
    if locks.is_empty() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    let mut remaining = Vec::new();
    for lock in locks {
        let old_enough = lock.age.map_or(false, |age| age >= min_age);
        if clear && old_enough {
            std::fs::remove_file(&lock.path)?;
            info!(path = %lock.path.display(), "removed stale lock file");
            removed.push(lock.path);
        } else {
            warn!(path = %lock.path.display(), age = ?lock.age, "lock file present");
            remaining.push(lock.path);
        }
    }

    if remaining.is_empty() {
        Ok(removed)
    } else {
        Err(Error::StaleLocks(remaining))
    }
}
