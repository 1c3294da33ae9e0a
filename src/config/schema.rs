//! Configuration validation
//!
//! Load-time checks that the executor relies on: every run item carries
//! exactly one action, every default clause exactly one producer, and
//! option declarations are internally consistent.

use crate::config::types::{Config, Run, Task, TaskOption};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::option::referenced_shared_options;
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_options(&config.options)?;

    for (name, task) in &config.tasks {
        validate_task(name, task)?;
        validate_task_shorts(config, task)?;
    }

    Ok(())
}

/// Validate a single task
pub fn validate_task(_name: &str, task: &Task) -> ConfigResult<()> {
    // Args and options share the scope namespace
    for arg_name in task.args.keys() {
        if task.options.contains_key(arg_name) {
            return Err(ConfigError::DuplicateNames(arg_name.clone()));
        }
    }

    validate_options(&task.options)?;

    for run in task.run.iter().chain(task.finally.iter()) {
        validate_run_item(run)?;
    }

    Ok(())
}

/// Validate an option map: types, short-flag shape, required-option
/// invariants
fn validate_options(
    options: &indexmap::IndexMap<String, TaskOption>,
) -> ConfigResult<()> {
    for (name, option) in options {
        validate_option_type(&option.option_type)?;

        if let Some(short) = &option.short {
            let mut chars = short.chars();
            if !matches!((chars.next(), chars.next()), (Some(_), None)) {
                return Err(ConfigError::InvalidShortFlag(short.clone()));
            }
        }

        if option.required {
            if !option.default.is_empty() {
                return Err(ConfigError::RequiredWithDefault(name.clone()));
            }
            if option.private {
                return Err(ConfigError::RequiredPrivate(name.clone()));
            }
        }

        for clause in &option.default {
            let producers = clause.value.is_some() as u8 + clause.command.is_some() as u8;
            if producers != 1 {
                return Err(ConfigError::AmbiguousDefault(name.clone()));
            }
        }
    }

    Ok(())
}

/// Short flags must be unique across the scope a task exposes as flags:
/// its own options plus the shared options it references. Private options
/// never become flags and carry no short.
fn validate_task_shorts(config: &Config, task: &Task) -> ConfigResult<()> {
    let mut shorts = HashSet::new();

    let shared = referenced_shared_options(config, task);
    let scope = task.options.iter().chain(
        shared
            .iter()
            .filter_map(|name| config.options.get_key_value(name)),
    );

    for (_, option) in scope {
        if option.private {
            continue;
        }
        if let Some(short) = &option.short {
            if let Some(c) = short.chars().next() {
                if !shorts.insert(c) {
                    return Err(ConfigError::DuplicateShortFlag(c));
                }
            }
        }
    }

    Ok(())
}

/// Validate an option type string
fn validate_option_type(option_type: &str) -> ConfigResult<()> {
    match option_type {
        "string" | "bool" | "boolean" | "int" | "integer" | "float" => Ok(()),
        _ => Err(ConfigError::Invalid(format!(
            "Invalid option type: {}. Must be one of: string, bool, int, float",
            option_type
        ))),
    }
}

/// Enforce the exactly-one-action rule for a run item
fn validate_run_item(run: &Run) -> ConfigResult<()> {
    let item = match run {
        Run::SimpleCommand(_) => return Ok(()),
        Run::Complex(item) => item,
    };

    let actions = !item.command.is_empty() as u8
        + !item.task.is_empty() as u8
        + !item.set_environment.is_empty() as u8;

    if actions != 1 {
        return Err(ConfigError::AmbiguousRunItem);
    }

    Ok(())
}
