// Rust guideline compliant 2026-10-19

//! forksync CLI library.
//!
//! This library exposes the CLI modules for use in tests and the binary.

pub mod cli;
pub mod commands;
pub mod console;
pub mod logging;
pub mod output_mode;
pub mod terminal;

pub use cli::Cli;
pub use console::ConsoleObserver;
pub use terminal::should_use_color;
