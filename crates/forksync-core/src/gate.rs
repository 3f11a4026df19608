// Rust guideline compliant 2026-10-19

//! Resolution gates decide how a run paused on a rebase conflict continues.
//!
//! An interactive terminal waits for the operator indefinitely; automation
//! either polls the repository until the rebase is finished or fails at once.

use crate::pipeline::PausedRun;
use crate::vcs::{RepoOperation, Vcs};
use crate::Result;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What to do with a paused run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The operator reports the rebase is finished; verify and continue.
    Resume,
    /// Stop the run, leaving the rebase for manual handling.
    Abandon,
}

/// Policy for leaving the paused state.
pub trait ResolutionGate {
    /// Blocks until a decision is made for `paused`.
    ///
    /// # Errors
    ///
    /// Returns an error if input cannot be read or the repository cannot be queried.
    fn await_resolution(&mut self, paused: &PausedRun, vcs: &dyn Vcs) -> Result<GateDecision>;
}

/// Asks the operator on a terminal and waits without a timeout.
pub struct PromptGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    /// Creates a gate reading answers from `input` and writing prompts to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ResolutionGate for PromptGate<R, W> {
    fn await_resolution(&mut self, paused: &PausedRun, _vcs: &dyn Vcs) -> Result<GateDecision> {
        loop {
            write!(
                self.output,
                "Finish the rebase of '{}' in another shell, then press Enter to continue \
                 (or type 'abort' to stop here): ",
                paused.branch()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                debug!("input closed while paused");
                return Ok(GateDecision::Abandon);
            }

            match line.trim().to_lowercase().as_str() {
                "" | "y" | "yes" | "c" | "continue" => return Ok(GateDecision::Resume),
                "a" | "abort" | "n" | "no" | "q" | "quit" => return Ok(GateDecision::Abandon),
                other => {
                    writeln!(self.output, "Unrecognised answer '{}'.", other)?;
                }
            }
        }
    }
}

/// Polls the repository until the rebase is no longer in progress.
#[derive(Debug, Clone, Copy)]
pub struct PollGate {
    timeout: Duration,
    interval: Duration,
}

impl PollGate {
    /// Creates a gate that gives up after `timeout`, checking once per second.
    pub fn new(timeout: Duration) -> Self {
        Self::with_interval(timeout, Duration::from_secs(1))
    }

    /// Creates a gate with a custom polling interval.
    pub fn with_interval(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl ResolutionGate for PollGate {
    fn await_resolution(&mut self, paused: &PausedRun, vcs: &dyn Vcs) -> Result<GateDecision> {
        let started = Instant::now();
        loop {
            if vcs.operation_in_progress()? != Some(RepoOperation::Rebase) {
                info!(branch = paused.branch(), "rebase finished while paused");
                return Ok(GateDecision::Resume);
            }
            if started.elapsed() >= self.timeout {
                info!(branch = paused.branch(), timeout = ?self.timeout, "gave up waiting");
                return Ok(GateDecision::Abandon);
            }
            std::thread::sleep(self.interval);
        }
    }
}

/// Abandons immediately; for runs with no operator and no wait budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailGate;

impl ResolutionGate for FailGate {
    fn await_resolution(&mut self, _paused: &PausedRun, _vcs: &dyn Vcs) -> Result<GateDecision> {
        Ok(GateDecision::Abandon)
    }
}
