// Rust guideline compliant 2026-10-19

//! forksync
//!
//! Keeps a fork's primary and development branches in step with upstream.

use clap::Parser;
use forksync_cli::{commands, logging, output_mode, should_use_color, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    output_mode::set_json_output(cli.json);
    output_mode::set_quiet(cli.quiet);
    output_mode::set_color(!cli.no_color && should_use_color());

    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("forksync: {:#}", err);
        return ExitCode::from(1);
    }

    let code = commands::sync::execute(&cli);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
