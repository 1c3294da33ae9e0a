//! CLI interface and argument parsing
//!
//! This module handles the command-line surface: building the dynamic
//! command tree from the configuration and dispatching the selected task.

pub mod app;

// Re-export main types
pub use app::*;
