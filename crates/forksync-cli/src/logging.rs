// Rust guideline compliant 2026-10-19

//! Diagnostic logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Log level used for a given `-v` count.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` cannot be parsed.
pub fn init(verbose: u8) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| anyhow!("invalid RUST_LOG: {}", e))?
        }
        _ => EnvFilter::new(level_for(verbose)),
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}
