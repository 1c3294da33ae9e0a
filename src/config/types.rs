//! Core configuration types
//!
//! This module defines the data structures that represent a rask.yml
//! configuration file. Maps preserve declaration order, which the option
//! resolver relies on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Global interpreter to use for commands (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Shared options, available to any task that references them
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, TaskOption>,

    /// Tasks defined in the configuration
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this task is private (hidden from the command line)
    #[serde(default)]
    pub private: bool,

    /// Whether this task suppresses command echo
    #[serde(default)]
    pub quiet: bool,

    /// Positional arguments for the task
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub args: IndexMap<String, Arg>,

    /// Named options (flags) for the task
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, TaskOption>,

    /// Run items to execute
    #[serde(
        default,
        deserialize_with = "deserialize_run_items",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub run: Vec<Run>,

    /// Finally block - executes after run, even on error
    #[serde(
        default,
        deserialize_with = "deserialize_run_items",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub finally: Vec<Run>,
}

/// A run item - a bare command string or a full item
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Run {
    /// Simple string command
    SimpleCommand(String),

    /// Full run item with conditions and an action
    Complex(RunItem),
}

/// A run item with conditions and exactly one action kind
///
/// The parsed form is permissive; `schema::validate_config` enforces the
/// exactly-one-action rule before anything executes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunItem {
    /// Conditions that must all pass for this run item to execute
    #[serde(
        default,
        deserialize_with = "deserialize_when_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<When>,

    /// Commands to execute
    #[serde(
        default,
        deserialize_with = "deserialize_commands",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub command: Vec<Command>,

    /// Sub-tasks to execute
    #[serde(
        default,
        deserialize_with = "deserialize_subtasks",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub task: Vec<SubTask>,

    /// Environment variables to set (null unsets)
    #[serde(
        rename = "set-environment",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub set_environment: IndexMap<String, Option<String>>,
}

/// A command to execute
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Simple string command
    Simple(String),

    /// Command with additional options
    Complex(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress the echo for this command
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// A reference to a sub-task to execute
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SubTask {
    /// Simple task name
    Simple(String),

    /// Sub-task with argument values for its options
    Complex(SubTaskDetail),
}

/// Detailed sub-task specification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubTaskDetail {
    /// Name of the task to run
    pub name: String,

    /// Values to seed into the sub-task's options
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
}

/// A conditional check-group
///
/// Within one group, every present key must pass. `os` matches any listed
/// entry; the other keys check every listed entry or pair.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct When {
    /// Pass iff every listed command exits 0
    #[serde(
        default,
        deserialize_with = "deserialize_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub command: Vec<String>,

    /// Pass iff every listed path exists
    #[serde(
        default,
        deserialize_with = "deserialize_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub exists: Vec<String>,

    /// Pass iff the host OS matches any listed entry
    #[serde(
        default,
        deserialize_with = "deserialize_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub os: Vec<String>,

    /// Pass iff each environment variable equals the value (null = unset)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, Option<String>>,

    /// Pass iff each named option's value equals the scalar
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub equal: IndexMap<String, serde_yaml::Value>,

    /// Pass iff each named option's value differs from the scalar
    #[serde(
        rename = "not-equal",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub not_equal: IndexMap<String, serde_yaml::Value>,
}

/// An option (flag) definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskOption {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Short flag (single character)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    /// Option type (string, int, float, bool)
    #[serde(rename = "type", default = "default_option_type")]
    pub option_type: String,

    /// Environment variable to read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Private option (no flag, no environment lookup)
    #[serde(default)]
    pub private: bool,

    /// Required option
    #[serde(default)]
    pub required: bool,

    /// Allowed values for flag- and environment-sourced input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<serde_yaml::Value>>,

    /// Ordered default clauses; the first whose guard passes produces the value
    #[serde(
        default,
        deserialize_with = "deserialize_defaults",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub default: Vec<DefaultClause>,
}

impl Default for TaskOption {
    fn default() -> Self {
        TaskOption {
            usage: None,
            short: None,
            option_type: default_option_type(),
            environment: None,
            private: false,
            required: false,
            values: None,
            default: Vec::new(),
        }
    }
}

fn default_option_type() -> String {
    "string".to_string()
}

/// A guarded producer of an option's default value
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DefaultClause {
    /// Guard; an omitted when is always true
    #[serde(
        default,
        deserialize_with = "deserialize_when_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub when: Vec<When>,

    /// Literal value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_yaml::Value>,

    /// Command whose trimmed stdout becomes the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// An argument (positional parameter) definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Arg {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Required argument
    #[serde(default)]
    pub required: bool,
}

/// Custom deserializer for run items that handles both single values and arrays
fn deserialize_run_items<'de, D>(deserializer: D) -> Result<Vec<Run>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string command
        Value::String(s) => Ok(vec![Run::SimpleCommand(s)]),
        // Single full run item
        Value::Mapping(_) => {
            let run = Run::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![run])
        }
        // Array of run items
        Value::Sequence(seq) => {
            let mut runs = Vec::new();
            for item in seq {
                let run = Run::deserialize(item).map_err(D::Error::custom)?;
                runs.push(run);
            }
            Ok(runs)
        }
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}

/// Custom deserializer for commands that handles both single values and arrays
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<Command>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![Command::Simple(s)]),
        Value::Mapping(_) => {
            let cmd = Command::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![cmd])
        }
        Value::Sequence(seq) => {
            let mut cmds = Vec::new();
            for item in seq {
                let cmd = Command::deserialize(item).map_err(D::Error::custom)?;
                cmds.push(cmd);
            }
            Ok(cmds)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("command must be a string, object, or array")),
    }
}

/// Custom deserializer for sub-tasks that handles both single values and arrays
fn deserialize_subtasks<'de, D>(deserializer: D) -> Result<Vec<SubTask>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![SubTask::Simple(s)]),
        Value::Mapping(_) => {
            let task = SubTask::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![task])
        }
        Value::Sequence(seq) => {
            let mut tasks = Vec::new();
            for item in seq {
                let task = SubTask::deserialize(item).map_err(D::Error::custom)?;
                tasks.push(task);
            }
            Ok(tasks)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("task must be a string, object, or array")),
    }
}

/// Custom deserializer for when guards: a single check-group or a list
fn deserialize_when_list<'de, D>(deserializer: D) -> Result<Vec<When>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Mapping(_) => {
            let when = When::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![when])
        }
        Value::Sequence(seq) => {
            let mut whens = Vec::new();
            for item in seq {
                let when = When::deserialize(item).map_err(D::Error::custom)?;
                whens.push(when);
            }
            Ok(whens)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("when must be an object or array")),
    }
}

/// Custom deserializer for scalar-or-list string fields
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => {
            let mut items = Vec::new();
            for item in seq {
                match item {
                    Value::String(s) => items.push(s),
                    _ => return Err(D::Error::custom("expected a string")),
                }
            }
            Ok(items)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("expected a string or array of strings")),
    }
}

/// Custom deserializer for option defaults: a bare scalar, a single clause,
/// or a list of clauses
fn deserialize_defaults<'de, D>(deserializer: D) -> Result<Vec<DefaultClause>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_yaml::Value;

    fn clause_from<E: serde::de::Error>(value: Value) -> Result<DefaultClause, E> {
        match value {
            Value::Mapping(_) => DefaultClause::deserialize(value).map_err(E::custom),
            scalar @ (Value::String(_) | Value::Bool(_) | Value::Number(_)) => {
                Ok(DefaultClause {
                    when: Vec::new(),
                    value: Some(scalar),
                    command: None,
                })
            }
            _ => Err(E::custom("default must be a scalar, object, or array")),
        }
    }

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(seq) => {
            let mut clauses = Vec::new();
            for item in seq {
                clauses.push(clause_from::<D::Error>(item)?);
            }
            Ok(clauses)
        }
        other => Ok(vec![clause_from::<D::Error>(other)?]),
    }
}
