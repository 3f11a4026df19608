// Rust guideline compliant 2026-10-19

//! Command-line argument model.

use clap::Parser;
use forksync_core::Overrides;
use std::path::PathBuf;

/// Top-level arguments of `forksync`.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "forksync",
    version,
    about = "Keep a fork's main and development branches in step with upstream",
    long_about = "forksync fetches the upstream mainline, brings the local primary branch up to date, \
                  integrates it into your development branch and publishes both to your fork. \
                  Uncommitted work is held aside in a labelled stash and given back at the end.",
    after_help = "Examples:\n  forksync\n  forksync feature-x --merge\n  forksync --no-push --stay\n  forksync --json --pause-timeout 600\n"
)]
pub struct Cli {
    /// Development branch to update (default from configuration, then `dev`)
    pub branch: Option<String>,

    /// Do not push anything
    #[arg(long)]
    pub no_push: bool,

    /// Do not push the primary branch
    #[arg(long = "no-push-main")]
    pub no_push_main: bool,

    /// Push the primary branch with a lease instead of fast-forward only
    #[arg(long = "force-main", conflicts_with_all = ["no_push", "no_push_main"])]
    pub force_main: bool,

    /// Merge the primary branch instead of rebasing onto it
    #[arg(long)]
    pub merge: bool,

    /// Leave untracked files out of the held-aside changes
    #[arg(long)]
    pub no_untracked: bool,

    /// Stay on the development branch afterwards
    #[arg(long)]
    pub stay: bool,

    /// Only print warnings, errors and conflict guidance
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Custom config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remove lock files left by a crashed git process
    #[arg(long)]
    pub clear_stale_locks: bool,

    /// Seconds to wait for a conflicted rebase to be finished when not on a terminal
    #[arg(long, value_name = "SECS")]
    pub pause_timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run as if started in this directory
    #[arg(short = 'C', value_name = "PATH")]
    pub directory: Option<PathBuf>,
}

impl Cli {
    /// Overrides that the flags apply on top of the loaded configuration.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dev_branch: self.branch.clone(),
            no_push: self.no_push,
            no_push_primary: self.no_push_main,
            force_primary: self.force_main,
            merge: self.merge,
            no_untracked: self.no_untracked,
            stay: self.stay,
            clear_stale_locks: self.clear_stale_locks,
            pause_timeout_secs: self.pause_timeout,
        }
    }
}
