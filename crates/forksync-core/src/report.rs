// Rust guideline compliant 2026-10-19

//! Per-run outcome record.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Repository, remote, branch and lock checks.
    Preflight,
    /// Holding aside uncommitted changes.
    WorkspaceGuard,
    /// Bringing the primary branch up to date with upstream.
    PrimarySync,
    /// Integrating the primary branch into the development branch.
    DevUpdate,
    /// Pushing the development branch to the fork.
    Publish,
    /// Reapplying held-aside changes and returning to the starting branch.
    WorkspaceRestore,
}

impl Step {
    /// All steps in execution order.
    pub const ALL: [Step; 6] = [
        Step::Preflight,
        Step::WorkspaceGuard,
        Step::PrimarySync,
        Step::DevUpdate,
        Step::Publish,
        Step::WorkspaceRestore,
    ];

    /// Human-readable step title.
    pub fn title(self) -> &'static str {
        match self {
            Step::Preflight => "Preflight",
            Step::WorkspaceGuard => "Workspace guard",
            Step::PrimarySync => "Primary branch sync",
            Step::DevUpdate => "Development branch update",
            Step::Publish => "Publish",
            Step::WorkspaceRestore => "Workspace restore",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What happened in a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step has not run.
    Pending,
    /// The step did its work.
    Done {
        /// Summary of the work.
        detail: String,
    },
    /// There was nothing to do, or the step was disabled.
    Skipped {
        /// Why the step did nothing.
        reason: String,
    },
    /// The step stopped the pipeline.
    Failed {
        /// Error message.
        reason: String,
    },
}

impl StepOutcome {
    /// Builds a `Done` outcome.
    pub fn done(detail: impl Into<String>) -> Self {
        StepOutcome::Done {
            detail: detail.into(),
        }
    }

    /// Builds a `Skipped` outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// Returns true for `Done`.
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done { .. })
    }

    /// Returns true for `Skipped`.
    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped { .. })
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Development branch that was synced.
    pub dev_branch: String,
    /// Branch checked out when the run started.
    pub original_branch: Option<String>,
    /// Label of the changeset held aside by the workspace guard.
    pub held_aside: Option<String>,
    /// Upstream commits integrated into the primary branch.
    pub primary_commits: usize,
    /// Lock files removed during preflight.
    pub cleared_locks: Vec<PathBuf>,
    /// Stash entries left in place for manual reapplication.
    pub kept_stashes: Vec<String>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
    /// Per-step outcomes in execution order.
    pub steps: Vec<StepRecord>,
}

/// Outcome of one step within a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// The step.
    pub step: Step,
    /// Its outcome.
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl SyncReport {
    /// Creates a report with every step pending.
    pub fn new(dev_branch: &str) -> Self {
        Self {
            dev_branch: dev_branch.to_string(),
            original_branch: None,
            held_aside: None,
            primary_commits: 0,
            cleared_locks: Vec::new(),
            kept_stashes: Vec::new(),
            warnings: Vec::new(),
            steps: Step::ALL
                .iter()
                .map(|&step| StepRecord {
                    step,
                    outcome: StepOutcome::Pending,
                })
                .collect(),
        }
    }

    /// Returns the outcome recorded for a step.
    pub fn outcome(&self, step: Step) -> &StepOutcome {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
            .unwrap_or(&StepOutcome::Pending)
    }

    /// Records the outcome of a step.
    pub fn record(&mut self, step: Step, outcome: StepOutcome) {
        if let Some(record) = self.steps.iter_mut().find(|record| record.step == step) {
            record.outcome = outcome;
        }
    }
}
