// Rust guideline compliant 2026-10-19

//! Observer that reports pipeline progress on the terminal.

use crate::output_mode;
use crate::terminal::{
    print_block, print_error, print_info, print_skipped, print_success, print_warning,
};
use forksync_core::{Step, StepOutcome, SyncObserver};

/// Prints one line per finished step; warnings and guidance survive `--quiet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl SyncObserver for ConsoleObserver {
    fn step_finished(&self, step: Step, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Failed { reason } => print_error(&format!("{}: {}", step, reason)),
            _ if output_mode::is_quiet() => {}
            StepOutcome::Done { detail } => print_success(&format!("{}: {}", step, detail)),
            StepOutcome::Skipped { reason } => print_skipped(&format!("{}: {}", step, reason)),
            StepOutcome::Pending => {}
        }
    }

    fn notice(&self, message: &str) {
        if !output_mode::is_quiet() {
            print_info(message);
        }
    }

    fn warning(&self, message: &str) {
        print_warning(message);
    }

    fn guidance(&self, lines: &[String]) {
        print_block(lines);
    }
}
