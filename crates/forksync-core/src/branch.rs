// Rust guideline compliant 2026-10-19

//! Idempotent branch switching with one bounded recovery attempt.

use crate::vcs::{RepoOperation, Vcs};
use crate::Result;
use tracing::{debug, warn};

/// Makes `name` the checked-out branch.
///
/// Does nothing when the branch is already checked out. If the switch fails,
/// any in-flight rebase or merge is aborted and the switch is retried once.
///
/// # Errors
///
/// Returns the retry's error when the second attempt also fails, or an error
/// from aborting the in-flight operation.
pub fn ensure_branch(vcs: &dyn Vcs, name: &str) -> Result<()> {
    if vcs.current_branch()?.as_deref() == Some(name) {
        debug!(branch = name, "already on branch");
        return Ok(());
    }

    let first = match vcs.checkout(name) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };
    warn!(branch = name, error = %first, "switch failed, recovering");

    if let Some(op @ (RepoOperation::Rebase | RepoOperation::Merge)) =
        vcs.operation_in_progress()?
    {
        warn!(operation = %op, "aborting in-flight operation before retrying");
        vcs.abort(op)?;
    }

    vcs.checkout(name)
}
