//! Error types for Rask

use std::io;
use thiserror::Error;

/// Result type alias for Rask operations
pub type Result<T> = std::result::Result<T, RaskError>;

/// Main error type for Rask
#[derive(Error, Debug)]
pub enum RaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RaskError {
    /// Process exit code for this error.
    ///
    /// A failing shell command mirrors the child's exit code; everything
    /// else is a configuration error and exits 1. Usage errors exit 2, but
    /// the argument parser raises and exits those before any `RaskError`
    /// exists.
    pub fn exit_code(&self) -> i32 {
        match self {
            RaskError::Execution(ExecutionError::CommandFailed(code)) => code.unwrap_or(1),
            _ => 1,
        }
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Run item must have exactly one action (command, task, or set-environment)")]
    AmbiguousRunItem,

    #[error("Default clause for option '{0}' must have exactly one of value or command")]
    AmbiguousDefault(String),

    #[error("Option '{0}' is required and cannot also declare a default")]
    RequiredWithDefault(String),

    #[error("Option '{0}' is required and cannot also be private")]
    RequiredPrivate(String),

    #[error("Argument and option '{0}' must have unique names within a task")]
    DuplicateNames(String),

    #[error("Short flag '{0}' must be a single character")]
    InvalidShortFlag(String),

    #[error("Short flag '-{0}' is declared by more than one option")]
    DuplicateShortFlag(char),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Option '{0}' is not defined")]
    UnknownOption(String),

    #[error("Circular option references: {0}")]
    CircularOption(String),

    #[error("Task recursion exceeded maximum depth: {0}")]
    RecursionLimit(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Option '{0}' is required but not provided")]
    MissingOption(String),

    #[error("Value '{value}' for option '{name}' must be one of: {allowed}")]
    InvalidValue {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("Value '{value}' for option '{name}' is not a valid {expected}")]
    TypeMismatch {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
