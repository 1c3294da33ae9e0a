//! Rask - A YAML-based task runner
//!
//! Rask executes named tasks from a simple YAML configuration file. Tasks
//! declare command-line options with guarded default values, and an ordered
//! program of shell commands, environment mutations, and sub-task calls,
//! all subject to `${name}` interpolation.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::{RaskError, Result};

/// Current version of Rask
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
