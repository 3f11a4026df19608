// Rust guideline compliant 2026-10-19

//! Implementation of the sync run behind the `forksync` command.

use crate::cli::Cli;
use crate::console::ConsoleObserver;
use crate::output_mode;
use crate::terminal::{print_block, print_error, print_success, print_warning};
use forksync_core::{
    Config, Error, FailGate, GitCli, Orchestrator, PollGate, PromptGate, ResolutionGate,
    SyncReport, SyncSettings, Vcs,
};
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Runs one sync and prints its outcome.
///
/// # Returns
///
/// The process exit code: 0 on success, otherwise the failure kind's code.
pub fn execute(cli: &Cli) -> i32 {
    execute_with_gate(cli, None)
}

/// Like [`execute`], with a caller-chosen gate for paused rebases.
///
/// `None` picks the gate from the terminal and configuration.
pub fn execute_with_gate(cli: &Cli, gate: Option<&mut dyn ResolutionGate>) -> i32 {
    let directory = cli.directory.as_deref().unwrap_or_else(|| Path::new("."));
    let vcs = match GitCli::discover(directory) {
        Ok(vcs) => vcs,
        Err(err) => return report_failure(&err, None, true),
    };

    let settings = match load_settings(cli, &vcs) {
        Ok(settings) => settings,
        Err(err) => return report_failure(&err, None, true),
    };
    debug!(?settings, "resolved settings");

    let observer = ConsoleObserver;
    let orchestrator = Orchestrator::new(&vcs, &settings, &observer);
    let mut selected;
    let gate = match gate {
        Some(gate) => gate,
        None => {
            selected = select_gate(&settings);
            selected.as_mut()
        }
    };

    match orchestrator.run(gate) {
        Ok(report) => report_success(&report),
        Err(failure) => report_failure(&failure.error, Some(&failure.report), false),
    }
}

fn load_settings(cli: &Cli, vcs: &GitCli) -> forksync_core::Result<SyncSettings> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(vcs.git_dir())?,
    };
    SyncSettings::resolve(&config, &cli.overrides())
}

/// Interactive terminals get a prompt; automation polls or fails fast.
fn select_gate(settings: &SyncSettings) -> Box<dyn ResolutionGate> {
    if atty::is(atty::Stream::Stdin) {
        debug!("paused rebases will prompt on the terminal");
        return Box::new(PromptGate::new(std::io::stdin().lock(), std::io::stderr()));
    }
    match settings.pause_timeout {
        Some(timeout) => {
            debug!(?timeout, "paused rebases will be polled");
            Box::new(PollGate::new(timeout))
        }
        None => Box::new(FailGate),
    }
}

/// JSON document printed for a successful run.
pub fn success_document(report: &SyncReport) -> serde_json::Value {
    json!({
        "success": true,
        "exit_code": 0,
        "report": report,
        "error": null,
    })
}

/// JSON document printed for a failed run; `report` is absent before the
/// pipeline starts.
pub fn failure_document(error: &Error, report: Option<&SyncReport>) -> serde_json::Value {
    json!({
        "success": false,
        "exit_code": error.kind().exit_code(),
        "report": report,
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
            "remedy": error.remedy(),
        },
    })
}

fn report_success(report: &SyncReport) -> i32 {
    if output_mode::is_json_output() {
        print_json(&success_document(report));
    } else {
        print_kept_stashes(report);
        if !output_mode::is_quiet() {
            print_success(&format!("Synced '{}'", report.dev_branch));
        }
    }
    0
}

/// Prints a failure; `show_remedy` is false when the pipeline already printed it.
fn report_failure(error: &Error, report: Option<&SyncReport>, show_remedy: bool) -> i32 {
    let code = error.kind().exit_code();
    if output_mode::is_json_output() {
        print_json(&failure_document(error, report));
        return code;
    }

    if let Some(report) = report {
        print_kept_stashes(report);
    }
    print_error(&error.to_string());
    if show_remedy {
        print_block(&error.remedy());
    }
    code
}

fn print_kept_stashes(report: &SyncReport) {
    for label in &report.kept_stashes {
        print_warning(&format!(
            "Your changes are still stashed as '{}'; reapply them with `git stash pop`",
            label
        ));
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(err) => print_error(&format!("Could not encode report: {}", err)),
    }
}
