// Rust guideline compliant 2026-10-19

//! The sync orchestrator.
//!
//! Steps run strictly in order: preflight, workspace guard, primary sync,
//! development update, publish, workspace restore. The first failing step stops
//! the pipeline; once a changeset is held aside, every failure path attempts to
//! give it back before returning.
//!
//! A rebase conflict on the development branch does not fail the run directly.
//! [`Orchestrator::start`] returns [`RunState::Paused`] instead, and the caller
//! continues with [`Orchestrator::resume`] or [`Orchestrator::abandon`], usually
//! through a [`ResolutionGate`] via [`Orchestrator::run`].

use crate::branch::ensure_branch;
use crate::config::IntegrationPolicy;
use crate::gate::{GateDecision, ResolutionGate};
use crate::hold::{HoldRelease, ProtectiveHold};
use crate::observer::SyncObserver;
use crate::preflight;
use crate::report::{Step, StepOutcome, SyncReport};
use crate::settings::SyncSettings;
use crate::vcs::{local_ref, tracking_ref, Integration, PushMode, RepoOperation, Vcs};
use crate::{Error, Result};
use std::fmt;
use tracing::{info, warn};

/// State carried between steps of one run.
#[derive(Debug)]
struct RunContext {
    report: SyncReport,
    guard: Option<ProtectiveHold>,
    /// Fork tip of the development branch as fetched, `None` before first publish.
    fork_tip: Option<String>,
    /// Local development tip before integration.
    dev_before: Option<String>,
}

/// Where a run stands after [`Orchestrator::start`].
#[derive(Debug)]
pub enum RunState {
    /// Every step ran.
    Completed(SyncReport),
    /// The development rebase stopped on conflicts and awaits the operator.
    Paused(PausedRun),
}

/// A run suspended inside the development branch update.
///
/// Holds everything needed to continue: the report so far, the top-level
/// held-aside changeset and the hold taken around the rebase.
#[derive(Debug)]
#[must_use = "a paused run must be resumed or abandoned"]
pub struct PausedRun {
    ctx: RunContext,
    rebase_hold: Option<ProtectiveHold>,
    onto: String,
}

impl PausedRun {
    /// Branch whose rebase is paused.
    pub fn branch(&self) -> &str {
        &self.ctx.report.dev_branch
    }

    /// Branch the rebase replays onto.
    pub fn onto(&self) -> &str {
        &self.onto
    }

    /// Report of the steps completed so far.
    pub fn report(&self) -> &SyncReport {
        &self.ctx.report
    }

    /// Stash labels that will be reapplied once the run continues.
    pub fn held_labels(&self) -> Vec<&str> {
        self.rebase_hold
            .iter()
            .chain(self.ctx.guard.iter())
            .map(ProtectiveHold::label)
            .collect()
    }
}

/// A run that stopped, with the report up to the failing step.
#[derive(Debug)]
pub struct SyncFailure {
    /// What went wrong.
    pub error: Error,
    /// Outcome of each step, including the failed one.
    pub report: SyncReport,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for SyncFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Sequences the sync steps against one repository.
pub struct Orchestrator<'a> {
    vcs: &'a dyn Vcs,
    settings: &'a SyncSettings,
    observer: &'a dyn SyncObserver,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator.
    pub fn new(vcs: &'a dyn Vcs, settings: &'a SyncSettings, observer: &'a dyn SyncObserver) -> Self {
        Self {
            vcs,
            settings,
            observer,
        }
    }

    /// Runs the whole pipeline, consulting `gate` if the development rebase pauses.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncFailure`] carrying the error and the partial report.
    pub fn run(&self, gate: &mut dyn ResolutionGate) -> std::result::Result<SyncReport, SyncFailure> {
        let mut paused = match self.start()? {
            RunState::Completed(report) => return Ok(report),
            RunState::Paused(paused) => paused,
        };

        match gate.await_resolution(&paused, self.vcs) {
            Ok(GateDecision::Resume) => self.resume(paused),
            Ok(GateDecision::Abandon) => Err(self.abandon(paused)),
            Err(err) => {
                self.warn(&mut paused.ctx, format!("Could not wait for the rebase: {}", err));
                Err(self.abandon(paused))
            }
        }
    }

    /// Runs steps until completion or until the development rebase pauses.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncFailure`] for any failing step.
    pub fn start(&self) -> std::result::Result<RunState, SyncFailure> {
        let mut ctx = RunContext {
            report: SyncReport::new(&self.settings.dev_branch),
            guard: None,
            fork_tip: None,
            dev_before: None,
        };

        self.begin(Step::Preflight);
        match preflight::run(self.vcs, self.settings) {
            Ok(found) => {
                let detail = match found.cleared_locks.len() {
                    0 => "repository ready".to_string(),
                    n => format!("repository ready, removed {} stale lock file(s)", n),
                };
                ctx.report.original_branch = found.original_branch;
                ctx.report.cleared_locks = found.cleared_locks;
                self.finish(&mut ctx, Step::Preflight, StepOutcome::done(detail));
            }
            Err(err) => return Err(self.fail(ctx, Step::Preflight, err)),
        }

        self.begin(Step::WorkspaceGuard);
        match ProtectiveHold::acquire(self.vcs, "guard", self.settings.include_untracked) {
            Ok(Some(hold)) => {
                let detail = format!("held aside local changes as '{}'", hold.label());
                ctx.report.held_aside = Some(hold.label().to_string());
                ctx.guard = Some(hold);
                self.finish(&mut ctx, Step::WorkspaceGuard, StepOutcome::done(detail));
            }
            Ok(None) => {
                self.finish(&mut ctx, Step::WorkspaceGuard, StepOutcome::skipped("working tree clean"));
            }
            Err(err) => return Err(self.fail(ctx, Step::WorkspaceGuard, err)),
        }

        self.begin(Step::PrimarySync);
        match self.sync_primary(&mut ctx) {
            Ok(outcome) => self.finish(&mut ctx, Step::PrimarySync, outcome),
            Err(err) => return Err(self.fail(ctx, Step::PrimarySync, err)),
        }

        self.begin(Step::DevUpdate);
        match self.update_dev(&mut ctx) {
            Ok(DevUpdate::Finished(outcome)) => self.finish(&mut ctx, Step::DevUpdate, outcome),
            Ok(DevUpdate::Paused { rebase_hold, onto }) => {
                self.pause_guidance(&ctx, rebase_hold.as_ref(), &onto);
                return Ok(RunState::Paused(PausedRun {
                    ctx,
                    rebase_hold,
                    onto,
                }));
            }
            Err(err) => return Err(self.fail(ctx, Step::DevUpdate, err)),
        }

        self.complete(ctx).map(RunState::Completed)
    }

    /// Continues a paused run once the operator has finished the rebase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RebaseUnfinished`] if the rebase is still in progress,
    /// [`Error::RebaseAbandoned`] if it was aborted, or any later step's failure.
    pub fn resume(&self, paused: PausedRun) -> std::result::Result<SyncReport, SyncFailure> {
        let PausedRun {
            mut ctx,
            rebase_hold,
            onto,
        } = paused;
        let dev = self.settings.dev_branch.clone();

        let verified = self
            .vcs
            .operation_in_progress()
            .and_then(|op| match op {
                Some(RepoOperation::Rebase) => Err(Error::RebaseUnfinished { branch: dev.clone() }),
                _ => Ok(()),
            })
            .and_then(|()| ensure_branch(self.vcs, &dev))
            .and_then(|()| self.vcs.is_ancestor(&local_ref(&onto), &local_ref(&dev)))
            .and_then(|integrated| {
                if integrated {
                    Ok(())
                } else {
                    Err(Error::RebaseAbandoned {
                        branch: dev.clone(),
                        onto: onto.clone(),
                    })
                }
            });
        if let Err(err) = verified {
            self.keep_nested(&mut ctx, rebase_hold);
            return Err(self.fail(ctx, Step::DevUpdate, err));
        }
        info!(branch = %dev, "rebase finished by operator");

        if let Some(hold) = rebase_hold {
            self.release_nested(&mut ctx, hold);
        }
        let detail = format!("rebased onto '{}' after manual conflict resolution", onto);
        self.finish(&mut ctx, Step::DevUpdate, StepOutcome::done(detail));

        self.complete(ctx)
    }

    /// Stops a paused run, leaving the rebase and held-aside changes in place.
    pub fn abandon(&self, paused: PausedRun) -> SyncFailure {
        let PausedRun {
            mut ctx,
            rebase_hold,
            onto,
        } = paused;
        info!(branch = %self.settings.dev_branch, "paused run abandoned");
        self.keep_nested(&mut ctx, rebase_hold);
        let err = Error::RebaseConflict {
            branch: self.settings.dev_branch.clone(),
            onto,
        };
        self.fail(ctx, Step::DevUpdate, err)
    }

    fn complete(&self, mut ctx: RunContext) -> std::result::Result<SyncReport, SyncFailure> {
        self.begin(Step::Publish);
        match self.publish(&ctx) {
            Ok(outcome) => self.finish(&mut ctx, Step::Publish, outcome),
            Err(err) => return Err(self.fail(ctx, Step::Publish, err)),
        }

        self.begin(Step::WorkspaceRestore);
        let outcome = self.restore(&mut ctx);
        self.finish(&mut ctx, Step::WorkspaceRestore, outcome);
        Ok(ctx.report)
    }

    fn sync_primary(&self, ctx: &mut RunContext) -> Result<StepOutcome> {
        let s = self.settings;
        if !self.vcs.fetch(&s.upstream_remote, &s.upstream_branch)? {
            return Err(Error::MissingUpstreamBranch {
                remote: s.upstream_remote.clone(),
                branch: s.upstream_branch.clone(),
            });
        }

        let upstream = tracking_ref(&s.upstream_remote, &s.upstream_branch);
        let primary = local_ref(&s.primary_branch);
        if self.vcs.is_ancestor(&upstream, &primary)? {
            return Ok(StepOutcome::skipped(format!(
                "'{}' already contains {}/{}",
                s.primary_branch, s.upstream_remote, s.upstream_branch
            )));
        }

        let incoming = self.vcs.count_commits(&primary, &upstream)?;
        ensure_branch(self.vcs, &s.primary_branch)?;
        if self.vcs.rebase(&upstream)? == Integration::Conflicted {
            return Err(Error::RebaseConflict {
                branch: s.primary_branch.clone(),
                onto: format!("{}/{}", s.upstream_remote, s.upstream_branch),
            });
        }
        ctx.report.primary_commits = incoming;
        info!(branch = %s.primary_branch, commits = incoming, "primary branch updated");

        if !s.push.pushes_primary() {
            return Ok(StepOutcome::done(format!(
                "integrated {} upstream commit(s), push disabled",
                incoming
            )));
        }

        let mode = if s.push.primary_lease {
            PushMode::Lease {
                expected: self
                    .vcs
                    .resolve(&tracking_ref(&s.fork_remote, &s.primary_branch))?,
            }
        } else {
            PushMode::FastForward
        };
        self.vcs.push(&s.fork_remote, &s.primary_branch, &mode)?;

        Ok(StepOutcome::done(format!(
            "integrated {} upstream commit(s), pushed to '{}'",
            incoming, s.fork_remote
        )))
    }

    fn update_dev(&self, ctx: &mut RunContext) -> Result<DevUpdate> {
        let s = self.settings;
        ensure_branch(self.vcs, &s.dev_branch)?;

        let dev = local_ref(&s.dev_branch);
        let primary = local_ref(&s.primary_branch);
        ctx.dev_before = self.vcs.resolve(&dev)?;
        ctx.fork_tip = if self.vcs.fetch(&s.fork_remote, &s.dev_branch)? {
            self.vcs.resolve(&tracking_ref(&s.fork_remote, &s.dev_branch))?
        } else {
            info!(remote = %s.fork_remote, branch = %s.dev_branch, "branch not yet on fork");
            None
        };

        if self.vcs.is_ancestor(&primary, &dev)? {
            return Ok(DevUpdate::Finished(StepOutcome::skipped(format!(
                "'{}' already contains '{}'",
                s.dev_branch, s.primary_branch
            ))));
        }

        match s.integration {
            IntegrationPolicy::Merge => match self.vcs.merge(&primary)? {
                Integration::Clean => Ok(DevUpdate::Finished(StepOutcome::done(format!(
                    "merged '{}'",
                    s.primary_branch
                )))),
                Integration::Conflicted => Err(Error::MergeConflict {
                    branch: s.dev_branch.clone(),
                    from: s.primary_branch.clone(),
                }),
            },
            IntegrationPolicy::Rebase => {
                let rebase_hold = ProtectiveHold::acquire(self.vcs, "rebase", false)?;
                match self.vcs.rebase(&primary) {
                    Ok(Integration::Clean) => {
                        if let Some(hold) = rebase_hold {
                            self.release_nested(ctx, hold);
                        }
                        Ok(DevUpdate::Finished(StepOutcome::done(format!(
                            "rebased onto '{}'",
                            s.primary_branch
                        ))))
                    }
                    Ok(Integration::Conflicted) => {
                        warn!(branch = %s.dev_branch, "rebase paused on conflicts");
                        Ok(DevUpdate::Paused {
                            rebase_hold,
                            onto: s.primary_branch.clone(),
                        })
                    }
                    Err(err) => {
                        self.keep_nested(ctx, rebase_hold);
                        Err(err)
                    }
                }
            }
        }
    }

    fn publish(&self, ctx: &RunContext) -> Result<StepOutcome> {
        let s = self.settings;
        if !s.push.enabled {
            return Ok(StepOutcome::skipped("pushing disabled"));
        }

        let dev = local_ref(&s.dev_branch);
        if let Some(fork_tip) = &ctx.fork_tip {
            if self.vcs.resolve(&dev)?.as_deref() == Some(fork_tip.as_str()) {
                return Ok(StepOutcome::skipped(format!(
                    "'{}' on '{}' is already up to date",
                    s.dev_branch, s.fork_remote
                )));
            }
            if let Some(before) = &ctx.dev_before {
                if !self.vcs.is_ancestor(fork_tip, before)? {
                    return Err(Error::PushRejected {
                        remote: s.fork_remote.clone(),
                        branch: s.dev_branch.clone(),
                        detail: "remote has commits not present locally".to_string(),
                    });
                }
            }
        }

        let mode = PushMode::Lease {
            expected: ctx.fork_tip.clone(),
        };
        self.vcs.push(&s.fork_remote, &s.dev_branch, &mode)?;
        Ok(StepOutcome::done(format!(
            "pushed '{}' to '{}'",
            s.dev_branch, s.fork_remote
        )))
    }

    /// Switches back to the starting branch, then reapplies the guard's changes.
    ///
    /// Never fails; problems become warnings and kept stash entries.
    fn restore(&self, ctx: &mut RunContext) -> StepOutcome {
        let mut actions = Vec::new();

        if self.settings.return_to_original {
            match ctx.report.original_branch.clone() {
                Some(original) => match self.vcs.current_branch() {
                    Ok(current) if current.as_deref() == Some(original.as_str()) => {}
                    _ => match ensure_branch(self.vcs, &original) {
                        Ok(()) => actions.push(format!("returned to '{}'", original)),
                        Err(err) => self.warn(
                            ctx,
                            format!("Could not switch back to '{}': {}", original, err),
                        ),
                    },
                },
                None => self.observer.notice("Run started on a detached HEAD; staying put"),
            }
        }

        if let Some(hold) = ctx.guard.take() {
            let label = hold.label().to_string();
            match hold.release(self.vcs) {
                Ok(HoldRelease::Restored) => actions.push("reapplied held-aside changes".to_string()),
                Ok(HoldRelease::Kept { label }) => self.keep(ctx, label, "did not reapply cleanly"),
                Err(err) => self.keep(ctx, label, &format!("could not be reapplied: {}", err)),
            }
        }

        if actions.is_empty() {
            StepOutcome::skipped("nothing to restore")
        } else {
            StepOutcome::done(actions.join(", "))
        }
    }

    /// Records a failure and gives the held-aside changes back where it is safe.
    fn fail(&self, mut ctx: RunContext, step: Step, error: Error) -> SyncFailure {
        warn!(step = %step, error = %error, "step failed");
        self.finish(
            &mut ctx,
            step,
            StepOutcome::Failed {
                reason: error.to_string(),
            },
        );
        self.observer.guidance(&error.remedy());

        if ctx.guard.is_some() {
            match self.vcs.operation_in_progress() {
                Ok(None) => {
                    self.begin(Step::WorkspaceRestore);
                    let outcome = self.restore(&mut ctx);
                    self.finish(&mut ctx, Step::WorkspaceRestore, outcome);
                }
                Ok(Some(op)) => {
                    if let Some(hold) = ctx.guard.take() {
                        let reason = format!("left in the stash while the {} is open", op);
                        self.keep(&mut ctx, hold.label().to_string(), &reason);
                    }
                }
                Err(err) => {
                    if let Some(hold) = ctx.guard.take() {
                        let reason = format!("left in the stash: {}", err);
                        self.keep(&mut ctx, hold.label().to_string(), &reason);
                    }
                }
            }
        }

        SyncFailure {
            error,
            report: ctx.report,
        }
    }

    fn release_nested(&self, ctx: &mut RunContext, hold: ProtectiveHold) {
        let label = hold.label().to_string();
        match hold.release(self.vcs) {
            Ok(HoldRelease::Restored) => {}
            Ok(HoldRelease::Kept { label }) => self.keep(ctx, label, "did not reapply cleanly after the rebase"),
            Err(err) => self.keep(ctx, label, &format!("could not be reapplied after the rebase: {}", err)),
        }
    }

    fn keep_nested(&self, ctx: &mut RunContext, hold: Option<ProtectiveHold>) {
        if let Some(hold) = hold {
            self.keep(ctx, hold.label().to_string(), "left in the stash");
        }
    }

    fn keep(&self, ctx: &mut RunContext, label: String, reason: &str) {
        self.warn(ctx, format!("Held-aside changes '{}' {}", label, reason));
        self.observer.guidance(&[
            "git stash list   # find the entry by its label".to_string(),
            "git stash pop stash@{N}   # reapply it once the tree is ready".to_string(),
        ]);
        ctx.report.kept_stashes.push(label);
    }

    fn pause_guidance(&self, ctx: &RunContext, rebase_hold: Option<&ProtectiveHold>, onto: &str) {
        let s = self.settings;
        let mut lines = vec![
            format!(
                "Rebasing '{}' onto '{}' stopped on conflicts. To finish it:",
                s.dev_branch, onto
            ),
            "  git status                # list conflicted files".to_string(),
            "  <edit files>, then git add <files>".to_string(),
            format!("  {}     # repeat until done", RepoOperation::Rebase.continue_command()),
            format!("  {}        # to give up", RepoOperation::Rebase.abort_command()),
        ];
        for hold in rebase_hold.into_iter().chain(ctx.guard.iter()) {
            lines.push(format!("Your uncommitted changes are safe in stash '{}'", hold.label()));
        }
        self.observer.guidance(&lines);
    }

    fn begin(&self, step: Step) {
        info!(step = %step, "step started");
        self.observer.step_started(step);
    }

    fn finish(&self, ctx: &mut RunContext, step: Step, outcome: StepOutcome) {
        info!(step = %step, outcome = ?outcome, "step finished");
        self.observer.step_finished(step, &outcome);
        ctx.report.record(step, outcome);
    }

    fn warn(&self, ctx: &mut RunContext, message: String) {
        warn!("{}", message);
        self.observer.warning(&message);
        ctx.report.warnings.push(message);
    }
}

/// Result of the development branch update.
enum DevUpdate {
    Finished(StepOutcome),
    Paused {
        rebase_hold: Option<ProtectiveHold>,
        onto: String,
    },
}
