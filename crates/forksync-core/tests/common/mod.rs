// Rust guideline compliant 2026-10-19

//! Scripted in-memory repository shared by the orchestrator tests.

#![allow(dead_code)]

use forksync_core::vcs::{local_ref, tracking_ref};
use forksync_core::{
    Error, Integration, PushMode, RepoOperation, Result, StashEntry, Step, StepOutcome,
    SyncObserver, Vcs, WorktreeStatus,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Mutable state of the fake repository.
#[derive(Debug, Default)]
pub struct FakeState {
    pub remotes: Vec<String>,
    /// Commit id to parent ids.
    pub commits: BTreeMap<String, Vec<String>>,
    /// Full ref name to commit id, local and remote-tracking.
    pub refs: BTreeMap<String, String>,
    /// Branches on each remote: (remote, branch) to commit id.
    pub remote_branches: BTreeMap<(String, String), String>,
    pub current: Option<String>,
    pub operation: Option<RepoOperation>,
    pub worktree: WorktreeStatus,
    /// Newest first: (message, held status).
    pub stash: Vec<(String, WorktreeStatus)>,
    /// Every mutating command, in order.
    pub log: Vec<String>,

    pub rebase_conflicts: BTreeSet<String>,
    pub merge_conflicts: bool,
    pub stash_push_fails: bool,
    pub stash_push_loses_entry: bool,
    pub pop_conflicts: bool,
    pub push_rejects: bool,
    pub checkout_failures: usize,
    /// While a rebase is open, `operation_in_progress` finishes it after this many polls.
    pub finish_rebase_after_polls: Option<usize>,
    pub pending_rebase: Option<(String, String)>,
    next_commit: usize,
}

/// A scripted [`Vcs`] recording every mutation.
pub struct FakeVcs {
    pub state: RefCell<FakeState>,
    dir: PathBuf,
}

impl FakeVcs {
    /// Upstream and origin remotes, `main` and `dev` at the same commit
    /// everywhere, `dev` checked out, clean tree.
    pub fn in_sync() -> Self {
        let vcs = Self {
            state: RefCell::new(FakeState::default()),
            dir: PathBuf::from("/nonexistent/forksync-fake/.git"),
        };
        {
            let mut s = vcs.state.borrow_mut();
            s.remotes = vec!["origin".to_string(), "upstream".to_string()];
            s.current = Some("dev".to_string());
        }
        vcs.commit("c0", &[]);
        vcs.set_branch("main", "c0");
        vcs.set_branch("dev", "c0");
        vcs.set_remote("upstream", "main", "c0");
        vcs.set_remote("origin", "main", "c0");
        vcs.set_remote("origin", "dev", "c0");
        vcs
    }

    /// Primary three commits behind upstream; dev equal to the old primary.
    pub fn three_behind() -> Self {
        let vcs = Self::in_sync();
        vcs.commit("u1", &["c0"]);
        vcs.commit("u2", &["u1"]);
        vcs.commit("u3", &["u2"]);
        vcs.set_remote("upstream", "main", "u3");
        vcs
    }

    pub fn commit(&self, id: &str, parents: &[&str]) {
        self.state
            .borrow_mut()
            .commits
            .insert(id.to_string(), parents.iter().map(|p| p.to_string()).collect());
    }

    pub fn set_branch(&self, branch: &str, commit: &str) {
        self.state
            .borrow_mut()
            .refs
            .insert(local_ref(branch), commit.to_string());
    }

    /// Sets the branch on the remote and its tracking ref, as after a fetch.
    pub fn set_remote(&self, remote: &str, branch: &str, commit: &str) {
        let mut s = self.state.borrow_mut();
        s.remote_branches
            .insert((remote.to_string(), branch.to_string()), commit.to_string());
        s.refs.insert(tracking_ref(remote, branch), commit.to_string());
    }

    pub fn remove_remote_branch(&self, remote: &str, branch: &str) {
        let mut s = self.state.borrow_mut();
        s.remote_branches
            .remove(&(remote.to_string(), branch.to_string()));
        s.refs.remove(&tracking_ref(remote, branch));
    }

    pub fn set_dirty(&self, staged: usize, modified: usize, untracked: usize) {
        self.state.borrow_mut().worktree = WorktreeStatus {
            staged,
            modified,
            untracked,
        };
    }

    pub fn branch_tip(&self, branch: &str) -> Option<String> {
        self.state.borrow().refs.get(&local_ref(branch)).cloned()
    }

    pub fn remote_tip(&self, remote: &str, branch: &str) -> Option<String> {
        self.state
            .borrow()
            .remote_branches
            .get(&(remote.to_string(), branch.to_string()))
            .cloned()
    }

    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| entry.starts_with("push "))
            .collect()
    }

    /// Commands that change refs, the index or the working tree.
    pub fn mutations(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| !entry.starts_with("fetch "))
            .collect()
    }

    pub fn stash_messages(&self) -> Vec<String> {
        self.state
            .borrow()
            .stash
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    /// Simulates the operator finishing a paused rebase.
    pub fn finish_rebase(&self) {
        let mut s = self.state.borrow_mut();
        finish_pending(&mut s);
    }

    /// Simulates the operator aborting a paused rebase.
    pub fn abort_rebase_externally(&self) {
        let mut s = self.state.borrow_mut();
        s.operation = None;
        s.pending_rebase = None;
    }

    fn ancestors(state: &FakeState, tip: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![tip.to_string()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(parents) = state.commits.get(&id) {
                stack.extend(parents.iter().cloned());
            }
        }
        seen
    }

    fn lookup(state: &FakeState, rev: &str) -> Option<String> {
        if let Some(id) = state.refs.get(rev) {
            return Some(id.clone());
        }
        if state.commits.contains_key(rev) {
            return Some(rev.to_string());
        }
        None
    }

    fn require(state: &FakeState, rev: &str) -> Result<String> {
        Self::lookup(state, rev).ok_or_else(|| Error::Command {
            args: format!("rev-parse {}", rev),
            detail: "unknown revision".to_string(),
        })
    }

    /// Result of replaying the current branch onto `onto`.
    fn integrate(state: &mut FakeState, onto: &str) -> Result<(String, String)> {
        let branch = state.current.clone().ok_or_else(|| Error::Command {
            args: "rebase".to_string(),
            detail: "not on a branch".to_string(),
        })?;
        let old = Self::require(state, &local_ref(&branch))?;
        let target = Self::require(state, onto)?;
        if Self::ancestors(state, &target).contains(&old) {
            return Ok((branch, target));
        }
        state.next_commit += 1;
        let id = format!("r{}", state.next_commit);
        state.commits.insert(id.clone(), vec![target, old]);
        Ok((branch, id))
    }
}

fn finish_pending(state: &mut FakeState) {
    if let Some((branch, id)) = state.pending_rebase.take() {
        state.refs.insert(local_ref(&branch), id);
    }
    state.operation = None;
}

impl Vcs for FakeVcs {
    fn workdir(&self) -> &Path {
        &self.dir
    }

    fn git_dir(&self) -> &Path {
        &self.dir
    }

    fn common_dir(&self) -> &Path {
        &self.dir
    }

    fn remotes(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().remotes.clone())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        Ok(self
            .state
            .borrow()
            .refs
            .keys()
            .filter_map(|name| name.strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.state.borrow().current.clone())
    }

    fn operation_in_progress(&self) -> Result<Option<RepoOperation>> {
        let mut s = self.state.borrow_mut();
        if s.operation == Some(RepoOperation::Rebase) {
            match s.finish_rebase_after_polls {
                Some(0) => {
                    s.finish_rebase_after_polls = None;
                    finish_pending(&mut s);
                }
                Some(n) => s.finish_rebase_after_polls = Some(n - 1),
                None => {}
            }
        }
        Ok(s.operation)
    }

    fn worktree_status(&self) -> Result<WorktreeStatus> {
        Ok(self.state.borrow().worktree)
    }

    fn resolve(&self, rev: &str) -> Result<Option<String>> {
        Ok(Self::lookup(&self.state.borrow(), rev))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let s = self.state.borrow();
        let ancestor = Self::require(&s, ancestor)?;
        let descendant = Self::require(&s, descendant)?;
        Ok(Self::ancestors(&s, &descendant).contains(&ancestor))
    }

    fn count_commits(&self, from: &str, to: &str) -> Result<usize> {
        let s = self.state.borrow();
        let from = Self::ancestors(&s, &Self::require(&s, from)?);
        let to = Self::ancestors(&s, &Self::require(&s, to)?);
        Ok(to.difference(&from).count())
    }

    fn stash_push(&self, message: &str, include_untracked: bool) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("stash push {}", message));
        if s.stash_push_fails {
            return Err(Error::Command {
                args: "stash push".to_string(),
                detail: "cannot save the current index state".to_string(),
            });
        }
        let mut held = s.worktree;
        let mut left = WorktreeStatus::default();
        if !include_untracked {
            left.untracked = held.untracked;
            held.untracked = 0;
        }
        s.worktree = left;
        if !s.stash_push_loses_entry {
            let on = s.current.clone().unwrap_or_else(|| "(no branch)".to_string());
            s.stash.insert(0, (format!("On {}: {}", on, message), held));
        }
        Ok(())
    }

    fn stash_list(&self) -> Result<Vec<StashEntry>> {
        Ok(self
            .state
            .borrow()
            .stash
            .iter()
            .enumerate()
            .map(|(i, (message, _))| StashEntry {
                reference: format!("stash@{{{}}}", i),
                message: message.clone(),
            })
            .collect())
    }

    fn stash_pop(&self, reference: &str) -> Result<Integration> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("stash pop {}", reference));
        let index: usize = reference
            .trim_start_matches("stash@{")
            .trim_end_matches('}')
            .parse()
            .map_err(|_| Error::Command {
                args: format!("stash pop {}", reference),
                detail: "not a stash reference".to_string(),
            })?;
        if index >= s.stash.len() {
            return Err(Error::Command {
                args: format!("stash pop {}", reference),
                detail: "no such entry".to_string(),
            });
        }
        if s.pop_conflicts {
            return Ok(Integration::Conflicted);
        }
        let (_, held) = s.stash.remove(index);
        s.worktree.staged += held.staged;
        s.worktree.modified += held.modified;
        s.worktree.untracked += held.untracked;
        Ok(Integration::Clean)
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<bool> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("fetch {} {}", remote, branch));
        match s
            .remote_branches
            .get(&(remote.to_string(), branch.to_string()))
            .cloned()
        {
            Some(tip) => {
                s.refs.insert(tracking_ref(remote, branch), tip);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("checkout {}", branch));
        if s.checkout_failures > 0 {
            s.checkout_failures -= 1;
            return Err(Error::CheckoutFailed {
                branch: branch.to_string(),
                detail: "local changes would be overwritten".to_string(),
            });
        }
        if s.operation.is_some() {
            return Err(Error::CheckoutFailed {
                branch: branch.to_string(),
                detail: "an operation is in progress".to_string(),
            });
        }
        if !s.refs.contains_key(&local_ref(branch)) {
            return Err(Error::CheckoutFailed {
                branch: branch.to_string(),
                detail: "invalid reference".to_string(),
            });
        }
        s.current = Some(branch.to_string());
        Ok(())
    }

    fn abort(&self, operation: RepoOperation) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("abort {}", operation));
        s.operation = None;
        s.pending_rebase = None;
        Ok(())
    }

    fn rebase(&self, onto: &str) -> Result<Integration> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("rebase {}", onto));
        let (branch, id) = Self::integrate(&mut s, onto)?;
        if s.rebase_conflicts.contains(&branch) {
            s.operation = Some(RepoOperation::Rebase);
            s.pending_rebase = Some((branch, id));
            return Ok(Integration::Conflicted);
        }
        s.refs.insert(local_ref(&branch), id);
        Ok(Integration::Clean)
    }

    fn merge(&self, rev: &str) -> Result<Integration> {
        let mut s = self.state.borrow_mut();
        s.log.push(format!("merge {}", rev));
        if s.merge_conflicts {
            s.operation = Some(RepoOperation::Merge);
            return Ok(Integration::Conflicted);
        }
        let (branch, id) = Self::integrate(&mut s, rev)?;
        s.refs.insert(local_ref(&branch), id);
        Ok(Integration::Clean)
    }

    fn push(&self, remote: &str, branch: &str, mode: &PushMode) -> Result<()> {
        let mut s = self.state.borrow_mut();
        let label = match mode {
            PushMode::FastForward => "ff".to_string(),
            PushMode::Lease { expected } => {
                format!("lease={}", expected.as_deref().unwrap_or("none"))
            }
        };
        s.log.push(format!("push {} {} {}", remote, branch, label));

        let reject = |detail: &str| Error::PushRejected {
            remote: remote.to_string(),
            branch: branch.to_string(),
            detail: detail.to_string(),
        };
        if s.push_rejects {
            return Err(reject("remote rejected"));
        }
        let local = Self::require(&s, &local_ref(branch))?;
        let key = (remote.to_string(), branch.to_string());
        let current = s.remote_branches.get(&key).cloned();
        match mode {
            PushMode::FastForward => {
                if let Some(current) = &current {
                    if !Self::ancestors(&s, &local).contains(current) {
                        return Err(reject("non-fast-forward"));
                    }
                }
            }
            PushMode::Lease { expected } => {
                if &current != expected {
                    return Err(reject("stale info"));
                }
            }
        }
        s.remote_branches.insert(key, local.clone());
        s.refs.insert(tracking_ref(remote, branch), local);
        Ok(())
    }
}

/// Observer capturing everything for assertions.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: RefCell<Vec<String>>,
    pub warnings: RefCell<Vec<String>>,
    pub guidance: RefCell<Vec<String>>,
}

impl SyncObserver for RecordingObserver {
    fn step_started(&self, step: Step) {
        self.events.borrow_mut().push(format!("start {:?}", step));
    }

    fn step_finished(&self, step: Step, outcome: &StepOutcome) {
        self.events
            .borrow_mut()
            .push(format!("finish {:?} {:?}", step, outcome));
    }

    fn warning(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn guidance(&self, lines: &[String]) {
        self.guidance.borrow_mut().extend(lines.iter().cloned());
    }
}
