//! Execution context for task running
//!
//! The context tracks all the state needed during task execution. Option
//! scopes are intentionally not part of it: a scope belongs to a single
//! task entry and dies with it.

use colored::Colorize;
use std::env;
use std::path::PathBuf;

/// Execution context that tracks state during task execution
pub struct Context {
    /// Current working directory
    pub working_dir: PathBuf,

    /// Configuration file path
    pub config_path: Option<PathBuf>,

    /// Command interpreter (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    /// Stack of tasks being executed (for depth accounting and reporting)
    pub task_stack: Vec<String>,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            task_stack: Vec::new(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<String> {
        self.task_stack.pop()
    }

    /// Current nesting depth
    pub fn task_depth(&self) -> usize {
        self.task_stack.len()
    }

    /// The task chain, for recursion-limit reporting
    pub fn task_chain(&self) -> String {
        self.task_stack.join(" -> ")
    }

    /// Echo a command before running it
    pub fn print_command(&self, print_str: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "$".green().bold(), print_str);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "debug:".dimmed(), message.dimmed());
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, task_name: &str) {
        self.print_debug(&format!("running task: {}", task_name));
    }

    /// Print run-item skip message
    pub fn print_item_skip(&self, task_name: &str) {
        self.print_debug(&format!("skipping guarded item in task: {}", task_name));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Select the command interpreter: the configuration's `interpreter` list
/// wins, then the SHELL environment variable, then `sh`.
pub fn select_interpreter(configured: Option<&[String]>) -> Vec<String> {
    if let Some(interpreter) = configured {
        if !interpreter.is_empty() {
            return interpreter.to_vec();
        }
    }

    if let Ok(shell) = env::var("SHELL") {
        if !shell.is_empty() {
            return vec![shell, "-c".to_string()];
        }
    }

    vec!["sh".to_string(), "-c".to_string()]
}
