//! Task execution engine
//!
//! The engine drives one task entry end to end: build the option scope
//! (which interpolates the document), re-parse the interpolated text, then
//! sequence the run items. Sub-task calls re-enter the engine from the
//! original configuration text, so every entry gets a fresh scope and
//! parent values reach it only through the explicit argument map.

use crate::config::{self, parse_config, Config};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::runner::{command, option, when, Context, Invocation, Scope};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::env;

/// Ceiling on task nesting. Mutual recursion between tasks is legal, so
/// runaway call chains surface as a configuration error instead of a stack
/// overflow.
const MAX_TASK_DEPTH: usize = 50;

/// Task engine bound to one loaded configuration
pub struct Runner {
    cfg_text: String,
    root: Config,
}

impl Runner {
    /// Parse and validate a configuration, keeping the raw text for the
    /// interpolation pipeline
    pub fn new(cfg_text: impl Into<String>) -> Result<Self> {
        let cfg_text = cfg_text.into();
        let root = parse_config(&cfg_text)?;
        config::validate_config(&root)?;
        Ok(Runner { cfg_text, root })
    }

    /// The parsed configuration root
    pub fn config(&self) -> &Config {
        &self.root
    }

    /// Execute a task by name
    pub fn run(&self, ctx: &mut Context, task_name: &str, invocation: &Invocation) -> Result<()> {
        if !self.root.tasks.contains_key(task_name) {
            return Err(ConfigError::TaskNotFound(task_name.to_string()).into());
        }

        if ctx.task_depth() >= MAX_TASK_DEPTH {
            let chain = format!("{} -> {}", ctx.task_chain(), task_name);
            return Err(ConfigError::RecursionLimit(chain).into());
        }

        ctx.push_task(task_name.to_string());
        let result = self.run_task(ctx, task_name, invocation);
        ctx.pop_task();
        result
    }

    fn run_task(&self, ctx: &mut Context, task_name: &str, invocation: &Invocation) -> Result<()> {
        ctx.print_task_start(task_name);

        let (final_text, scope) =
            option::resolve_scope(&self.cfg_text, task_name, invocation, ctx)?;

        let cfg = parse_config(&final_text)?;
        let task_cfg = cfg
            .tasks
            .get(task_name)
            .ok_or_else(|| ConfigError::TaskNotFound(task_name.to_string()))?;
        let task = ExecutableTask::from_config(task_cfg)?;

        let run_result = self.execute_items(&task.run, &scope, task.quiet, ctx);

        if task.finally.is_empty() {
            return run_result;
        }

        ctx.print_debug("running finally block");
        let finally_result = self.execute_items(&task.finally, &scope, task.quiet, ctx);

        // A failure in run wins over a failure in finally
        match run_result {
            Ok(()) => finally_result,
            err => err,
        }
    }

    fn execute_items(
        &self,
        items: &[RunItem],
        scope: &Scope,
        quiet: bool,
        ctx: &mut Context,
    ) -> Result<()> {
        for item in items {
            self.execute_item(item, scope, quiet, ctx)?;
        }
        Ok(())
    }

    /// Dispatch a single run item: evaluate its guard, then perform its one
    /// action
    fn execute_item(
        &self,
        item: &RunItem,
        scope: &Scope,
        quiet: bool,
        ctx: &mut Context,
    ) -> Result<()> {
        if !when::evaluate_when_list(&item.when, scope, ctx)? {
            if let Some(task_name) = ctx.task_stack.last().cloned() {
                ctx.print_item_skip(&task_name);
            }
            return Ok(());
        }

        match &item.action {
            Action::Commands(commands) => {
                for cmd in commands {
                    if !quiet && !cmd.quiet {
                        ctx.print_command(&cmd.print);
                    }
                    command::execute_command(&cmd.exec, cmd.dir.as_deref(), ctx)?;
                }
            }

            Action::SetEnvironment(entries) => {
                for (var, value) in entries {
                    match value {
                        Some(value) => env::set_var(var, value),
                        None => env::remove_var(var),
                    }
                }
            }

            Action::Subtasks(calls) => {
                for call in calls {
                    let invocation = Invocation::for_subtask(call.options.clone());
                    self.run(ctx, &call.name, &invocation)?;
                }
            }
        }

        Ok(())
    }
}

/// Runtime representation of a task, built from the interpolated text
#[derive(Debug, Clone)]
struct ExecutableTask {
    quiet: bool,
    run: Vec<RunItem>,
    finally: Vec<RunItem>,
}

impl ExecutableTask {
    fn from_config(task: &config::Task) -> ConfigResult<Self> {
        Ok(ExecutableTask {
            quiet: task.quiet,
            run: task
                .run
                .iter()
                .map(RunItem::from_config)
                .collect::<ConfigResult<_>>()?,
            finally: task
                .finally
                .iter()
                .map(RunItem::from_config)
                .collect::<ConfigResult<_>>()?,
        })
    }
}

/// Runtime representation of a run item: a guard plus exactly one action
#[derive(Debug, Clone)]
struct RunItem {
    when: Vec<config::When>,
    action: Action,
}

impl RunItem {
    fn from_config(run: &config::Run) -> ConfigResult<Self> {
        let item = match run {
            config::Run::SimpleCommand(exec) => {
                return Ok(RunItem {
                    when: Vec::new(),
                    action: Action::Commands(vec![Command::from_exec(exec)]),
                })
            }
            config::Run::Complex(item) => item,
        };

        let action = match (
            !item.command.is_empty(),
            !item.task.is_empty(),
            !item.set_environment.is_empty(),
        ) {
            (true, false, false) => {
                Action::Commands(item.command.iter().map(Command::from_config).collect())
            }
            (false, true, false) => {
                Action::Subtasks(item.task.iter().map(SubTaskCall::from_config).collect())
            }
            (false, false, true) => Action::SetEnvironment(item.set_environment.clone()),
            _ => return Err(ConfigError::AmbiguousRunItem),
        };

        Ok(RunItem {
            when: item.when.clone(),
            action,
        })
    }
}

/// The one thing a run item does
#[derive(Debug, Clone)]
enum Action {
    Commands(Vec<Command>),
    Subtasks(Vec<SubTaskCall>),
    SetEnvironment(IndexMap<String, Option<String>>),
}

/// Runtime representation of a command
#[derive(Debug, Clone)]
struct Command {
    exec: String,
    print: String,
    quiet: bool,
    dir: Option<String>,
}

impl Command {
    fn from_exec(exec: &str) -> Self {
        Command {
            exec: exec.to_string(),
            print: exec.to_string(),
            quiet: false,
            dir: None,
        }
    }

    fn from_config(cmd: &config::Command) -> Self {
        match cmd {
            config::Command::Simple(exec) => Command::from_exec(exec),
            config::Command::Complex(detail) => Command {
                print: detail.print.clone().unwrap_or_else(|| detail.exec.clone()),
                exec: detail.exec.clone(),
                quiet: detail.quiet,
                dir: detail.dir.clone(),
            },
        }
    }
}

/// Runtime representation of a sub-task call
#[derive(Debug, Clone)]
struct SubTaskCall {
    name: String,
    options: HashMap<String, String>,
}

impl SubTaskCall {
    fn from_config(subtask: &config::SubTask) -> Self {
        match subtask {
            config::SubTask::Simple(name) => SubTaskCall {
                name: name.clone(),
                options: HashMap::new(),
            },
            config::SubTask::Complex(detail) => SubTaskCall {
                name: detail.name.clone(),
                options: detail.options.clone().into_iter().collect(),
            },
        }
    }
}
