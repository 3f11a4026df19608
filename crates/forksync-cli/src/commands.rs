// Rust guideline compliant 2026-10-19

//! Command implementations.

pub mod sync;
