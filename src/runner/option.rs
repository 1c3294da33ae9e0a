//! Option resolution
//!
//! Builds a task's option scope: positional args first, then every option
//! in dependency order, choosing each value by priority (command-line flag,
//! then environment, then a parent-passed value, then the first default
//! clause whose guard passes, then the type's zero value). After each value
//! resolves, the remaining configuration text is re-interpolated, so later
//! options and the run block see it.

use crate::config::{parse_config, Config, Task, TaskOption, When};
use crate::error::{ConfigError, ExecutionError, Result};
use crate::runner::{command, interpolate, value, when, Context};
use crate::runner::value::OptionType;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::env;

/// Per-task mapping from option name to resolved canonical value
pub type Scope = IndexMap<String, String>;

/// Values supplied from outside the resolver for one task entry
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Values from command-line flags, keyed by option name
    pub flags: HashMap<String, String>,

    /// Values for positional args, keyed by arg name
    pub args: HashMap<String, String>,

    /// Values passed by a calling task, keyed by option name
    pub task_options: HashMap<String, String>,
}

impl Invocation {
    /// Invocation for a sub-task call carrying the caller's argument map
    pub fn for_subtask(options: HashMap<String, String>) -> Self {
        Invocation {
            task_options: options,
            ..Default::default()
        }
    }
}

/// Resolve a task's option scope against the raw configuration text
///
/// Returns the fully interpolated text (escapes collapsed, ready for the
/// final re-parse) together with the populated scope.
pub fn resolve_scope(
    cfg_text: &str,
    task_name: &str,
    invocation: &Invocation,
    ctx: &Context,
) -> Result<(String, Scope)> {
    let mut text = cfg_text.to_string();
    let mut scope = Scope::new();

    let cfg = parse_config(&text)?;
    let task = lookup_task(&cfg, task_name)?;

    // Positional args enter the scope before any option resolves
    for (name, arg) in &task.args {
        let resolved = match invocation.args.get(name) {
            Some(value) => value.clone(),
            None => match &arg.default {
                Some(default) => default.clone(),
                None if arg.required => {
                    return Err(ExecutionError::MissingOption(name.clone()).into())
                }
                None => String::new(),
            },
        };
        text = interpolate::apply(&text, name, &resolved);
        scope.insert(name.clone(), resolved);
    }

    let order = resolution_order(&cfg, task)?;

    for name in order {
        // Re-parse so this option's clauses reflect earlier substitutions
        let cfg = parse_config(&text)?;
        let task = lookup_task(&cfg, task_name)?;
        let option = task
            .options
            .get(&name)
            .or_else(|| cfg.options.get(&name))
            .ok_or_else(|| ConfigError::UnknownOption(name.clone()))?;

        let resolved = evaluate_option(&name, option, invocation, &scope, ctx)?;
        text = interpolate::apply(&text, &name, &resolved);
        scope.insert(name, resolved);
    }

    Ok((interpolate::escape(&text), scope))
}

fn lookup_task<'c>(cfg: &'c Config, name: &str) -> Result<&'c Task> {
    cfg.tasks
        .get(name)
        .ok_or_else(|| ConfigError::TaskNotFound(name.to_string()).into())
}

/// Compute the value of one option by priority
fn evaluate_option(
    name: &str,
    option: &TaskOption,
    invocation: &Invocation,
    scope: &Scope,
    ctx: &Context,
) -> Result<String> {
    let option_type = OptionType::from_name(&option.option_type).ok_or_else(|| {
        ConfigError::Invalid(format!("Invalid option type: {}", option.option_type))
    })?;

    // Flags and environment are the external surface; private options have
    // neither, and only these two sources are checked against the
    // allowed-values set.
    if !option.private {
        if let Some(raw) = invocation.flags.get(name) {
            let canonical = option_type.parse(name, raw)?;
            check_allowed(name, option, &canonical)?;
            return Ok(canonical);
        }

        if let Some(var) = &option.environment {
            if let Ok(raw) = env::var(var) {
                let canonical = option_type.parse(name, &raw)?;
                check_allowed(name, option, &canonical)?;
                return Ok(canonical);
            }
        }
    }

    // A caller-passed value is an internal assignment
    if let Some(passed) = invocation.task_options.get(name) {
        return Ok(passed.clone());
    }

    for clause in &option.default {
        if !when::evaluate_when_list(&clause.when, scope, ctx)? {
            continue;
        }

        if let Some(literal) = &clause.value {
            return value::scalar_string(literal).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "Default value for option '{}' must be a scalar",
                    name
                ))
                .into()
            });
        }

        if let Some(exec) = &clause.command {
            return Ok(command::capture_command(exec, ctx)?);
        }
    }

    if option.required {
        return Err(ExecutionError::MissingOption(name.to_string()).into());
    }

    Ok(option_type.zero().to_string())
}

fn check_allowed(name: &str, option: &TaskOption, canonical: &str) -> Result<()> {
    let values = match &option.values {
        Some(values) if !values.is_empty() => values,
        _ => return Ok(()),
    };

    let allowed: Vec<String> = values.iter().filter_map(value::scalar_string).collect();
    if allowed.iter().any(|v| v == canonical) {
        return Ok(());
    }

    Err(ExecutionError::InvalidValue {
        name: name.to_string(),
        value: canonical.to_string(),
        allowed: allowed.join(", "),
    }
    .into())
}

/// Order the options a task resolves: referenced shared options first, then
/// the task's own, each group starting from declaration order under a
/// stable topological sort by reference dependencies.
fn resolution_order(cfg: &Config, task: &Task) -> Result<Vec<String>> {
    let shared = referenced_shared_options(cfg, task);

    let mut names: Vec<String> = shared;
    for name in task.options.keys() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    // Dependency edges, restricted to the options being ordered; args are
    // already in scope and carry no edge.
    let mut deps: HashMap<String, Vec<String>> = HashMap::new();
    for name in &names {
        let option = task
            .options
            .get(name)
            .or_else(|| cfg.options.get(name))
            .ok_or_else(|| ConfigError::UnknownOption(name.clone()))?;
        let refs = option_references(option)
            .into_iter()
            .filter(|r| names.contains(r))
            .collect();
        deps.insert(name.clone(), refs);
    }

    let mut order: Vec<String> = Vec::with_capacity(names.len());
    let mut remaining = names;

    while !remaining.is_empty() {
        let next = remaining.iter().position(|name| {
            deps[name]
                .iter()
                .all(|dep| dep == name || order.contains(dep))
                && !deps[name].contains(name)
        });

        match next {
            Some(i) => order.push(remaining.remove(i)),
            None => {
                return Err(ConfigError::CircularOption(remaining.join(", ")).into());
            }
        }
    }

    Ok(order)
}

/// Shared options a task pulls in: those its text or guards reference,
/// expanded transitively through the shared options' own references.
/// Shared names shadowed by the task's own options or args are excluded.
pub fn referenced_shared_options(cfg: &Config, task: &Task) -> Vec<String> {
    let mut queue = task_references(task);
    let mut found: Vec<String> = Vec::new();

    while let Some(name) = queue.pop() {
        if task.options.contains_key(&name)
            || task.args.contains_key(&name)
            || found.contains(&name)
        {
            continue;
        }
        if let Some(option) = cfg.options.get(&name) {
            found.push(name);
            queue.extend(option_references(option));
        }
    }

    // Declaration order of the shared map, not discovery order
    cfg.options
        .keys()
        .filter(|name| found.contains(name))
        .cloned()
        .collect()
}

/// Names a task's definition references, textually or through guards
fn task_references(task: &Task) -> Vec<String> {
    let serialized = serde_yaml::to_string(task).unwrap_or_default();
    let mut refs = interpolate::references(&serialized);

    for option in task.options.values() {
        for clause in &option.default {
            collect_guard_keys(&clause.when, &mut refs);
        }
    }
    for run in task.run.iter().chain(task.finally.iter()) {
        if let crate::config::Run::Complex(item) = run {
            collect_guard_keys(&item.when, &mut refs);
        }
    }

    refs
}

/// Names one option's definition references
///
/// `${...}` tokens in the serialized clauses, plus option names used as
/// `equal`/`not-equal` keys in default-clause guards; guards read the
/// scope, so those options must resolve first.
fn option_references(option: &TaskOption) -> Vec<String> {
    let serialized = serde_yaml::to_string(option).unwrap_or_default();
    let mut refs = interpolate::references(&serialized);

    for clause in &option.default {
        collect_guard_keys(&clause.when, &mut refs);
    }

    refs
}

fn collect_guard_keys(whens: &[When], out: &mut Vec<String>) {
    for when in whens {
        for key in when.equal.keys().chain(when.not_equal.keys()) {
            if !out.contains(key) {
                out.push(key.clone());
            }
        }
    }
}
