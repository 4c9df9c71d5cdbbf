//! Terminal UI components for brewlint.
//!
//! Provides Ayu-themed color styling, terminal detection and rendering of
//! validation reports for human-readable CLI output.

pub mod styles;
pub mod terminal;
