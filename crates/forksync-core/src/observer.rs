// Rust guideline compliant 2026-10-19

//! Progress callbacks emitted while the pipeline runs.

use crate::report::{Step, StepOutcome};

/// Receives user-facing progress from the orchestrator.
///
/// All methods default to doing nothing so implementors pick what they show.
pub trait SyncObserver {
    /// A step is about to run.
    fn step_started(&self, _step: Step) {}

    /// A step finished, was skipped, or failed.
    fn step_finished(&self, _step: Step, _outcome: &StepOutcome) {}

    /// Informational message within a step.
    fn notice(&self, _message: &str) {}

    /// A non-fatal problem.
    fn warning(&self, _message: &str) {}

    /// Step-by-step instructions for the operator, e.g. conflict resolution.
    fn guidance(&self, _lines: &[String]) {}
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
