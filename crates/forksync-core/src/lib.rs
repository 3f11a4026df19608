// Rust guideline compliant 2026-10-19

//! forksync Core Library
//!
//! This crate provides the building blocks of the fork synchronisation pipeline:
//! - Configuration layering and the immutable run settings
//! - The `Vcs` seam and its `git`-backed implementation
//! - Protective holds (stash-backed held-aside changesets)
//! - Preflight checks, including stale lock detection
//! - Resolution gates for the paused-on-conflict state
//! - The orchestrator that sequences the steps and produces a report

pub mod branch;
pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod hold;
pub mod locks;
pub mod observer;
pub mod pipeline;
pub mod preflight;
pub mod report;
pub mod settings;
pub mod vcs;

pub use config::{Config, IntegrationPolicy};
pub use error::{Error, FailureKind, Result};
pub use gate::{FailGate, GateDecision, PollGate, PromptGate, ResolutionGate};
pub use git::GitCli;
pub use hold::{HoldRelease, ProtectiveHold, HOLD_MARKER};
pub use observer::{NoopObserver, SyncObserver};
pub use pipeline::{Orchestrator, PausedRun, RunState, SyncFailure};
pub use report::{Step, StepOutcome, SyncReport};
pub use settings::{Overrides, PushPolicy, SyncSettings};
pub use vcs::{Integration, PushMode, RepoOperation, StashEntry, Vcs, WorktreeStatus};
