// Rust guideline compliant 2026-10-19

//! Process-wide output mode settings.

use std::sync::atomic::{AtomicBool, Ordering};

static JSON_OUTPUT_ENABLED: AtomicBool = AtomicBool::new(false);
static QUIET_ENABLED: AtomicBool = AtomicBool::new(false);
static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

/// Enables or disables JSON output mode for the current process.
pub fn set_json_output(enabled: bool) {
    JSON_OUTPUT_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns whether JSON output mode is enabled.
pub fn is_json_output() -> bool {
    JSON_OUTPUT_ENABLED.load(Ordering::Relaxed)
}

/// Enables or disables quiet mode (progress lines suppressed).
pub fn set_quiet(enabled: bool) {
    QUIET_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns whether quiet mode is enabled.
pub fn is_quiet() -> bool {
    QUIET_ENABLED.load(Ordering::Relaxed)
}

/// Enables or disables colored output.
pub fn set_color(enabled: bool) {
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns whether colored output is enabled.
pub fn is_color() -> bool {
    COLOR_ENABLED.load(Ordering::Relaxed)
}
