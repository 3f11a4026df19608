// Rust guideline compliant 2026-10-19

//! Scoped protective holds: uncommitted edits moved into a labelled stash entry
//! and reapplied later.
//!
//! The same capability guards the whole run and, nested inside it, the
//! development-branch rebase. Entries are found again by label rather than by
//! position, since a nested hold may push another entry on top.

use crate::vcs::{Integration, StashEntry, Vcs};
use crate::{Error, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Fixed marker present in every stash message created by forksync.
pub const HOLD_MARKER: &str = "forksync-autostash";

/// An outstanding held-aside changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a held-aside changeset must be released or reported"]
pub struct ProtectiveHold {
    label: String,
}

/// What happened when a hold was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldRelease {
    /// The changes are back in the working tree and the entry was dropped.
    Restored,
    /// Reapplying conflicted; the entry is still in the stash.
    Kept {
        /// Label of the kept entry.
        label: String,
    },
}

impl ProtectiveHold {
    /// Holds aside uncommitted changes, if there are any.
    ///
    /// # Arguments
    ///
    /// * `vcs` - Repository to operate on
    /// * `scope` - Short name of the holder, included in the label
    /// * `include_untracked` - Whether untracked files are held aside too
    ///
    /// # Returns
    ///
    /// `None` when the working tree has nothing to protect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HoldFailed`] when the stash cannot be created or the new
    /// entry cannot be found afterwards.
    pub fn acquire(vcs: &dyn Vcs, scope: &str, include_untracked: bool) -> Result<Option<Self>> {
        let status = vcs.worktree_status()?;
        if !status.has_changes(include_untracked) {
            debug!(scope, "nothing to hold aside");
            return Ok(None);
        }

        let label = new_label(scope);
        vcs.stash_push(&label, include_untracked)
            .map_err(|e| Error::HoldFailed(e.to_string()))?;

        let entries = vcs
            .stash_list()
            .map_err(|e| Error::HoldFailed(e.to_string()))?;
        if find_entry(&entries, &label).is_none() {
            return Err(Error::HoldFailed(format!(
                "stash entry '{}' was not created",
                label
            )));
        }

        info!(
            label = %label,
            staged = status.staged,
            modified = status.modified,
            untracked = status.untracked,
            "held aside local changes"
        );
        Ok(Some(Self { label }))
    }

    /// Label identifying the stash entry.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Reapplies the held changes and drops the entry.
    ///
    /// A conflict while reapplying is not an error: the entry stays in the
    /// stash and [`HoldRelease::Kept`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry can no longer be found or git fails.
    pub fn release(self, vcs: &dyn Vcs) -> Result<HoldRelease> {
        let entries = vcs.stash_list()?;
        let entry = find_entry(&entries, &self.label).ok_or_else(|| {
            Error::HoldFailed(format!("stash entry '{}' has disappeared", self.label))
        })?;

        match vcs.stash_pop(&entry.reference)? {
            Integration::Clean => {
                info!(label = %self.label, "restored held-aside changes");
                Ok(HoldRelease::Restored)
            }
            Integration::Conflicted => {
                warn!(label = %self.label, "held-aside changes did not reapply cleanly");
                Ok(HoldRelease::Kept { label: self.label })
            }
        }
    }
}

fn new_label(scope: &str) -> String {
    format!(
        "{} {} {} pid{}",
        HOLD_MARKER,
        scope,
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ"),
        std::process::id()
    )
}

fn find_entry<'a>(entries: &'a [StashEntry], label: &str) -> Option<&'a StashEntry> {
    entries.iter().find(|entry| entry.message.contains(label))
}
