//! Task execution engine
//!
//! This module handles the execution of tasks: option resolution,
//! interpolation, conditional guards, and run-item dispatch.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod option;
pub mod task;
pub mod value;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use option::*;
pub use task::*;
pub use value::*;
pub use when::*;
