//! Main CLI application
//!
//! The command surface is built dynamically from the loaded configuration:
//! one subcommand per non-private task, with flags for the task's options
//! and for the shared options it references. Option defaults and
//! environment bindings are *not* wired into clap; the resolver owns the
//! whole priority lattice, so only values actually present on the command
//! line are collected here.

use crate::config::{find_config_file, read_config_text, Config, Task, TaskOption};
use crate::error::{ConfigError, Result};
use crate::runner::{
    referenced_shared_options, select_interpreter, Context, Invocation, Runner, Verbosity,
};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::env;
use std::path::PathBuf;

/// Run the CLI application and report the process exit code
pub fn run() -> i32 {
    let args: Vec<String> = env::args().collect();

    match execute(&args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            e.exit_code()
        }
    }
}

/// Load the configuration and dispatch the selected task
fn execute(args: &[String]) -> Result<()> {
    let config_path = match extract_file_arg(args) {
        Some(path) => path,
        None => find_config_file()?,
    };
    let text = read_config_text(&config_path)?;

    let runner = Runner::new(text)?;
    let mut command = build_command(runner.config());

    // Usage errors print through clap and exit 2
    let matches = command.clone().get_matches_from(args);

    let (task_name, task_matches) = match matches.subcommand() {
        Some((name, sub_matches)) => (name.to_string(), sub_matches),
        None => {
            command.print_help()?;
            println!();
            return Ok(());
        }
    };

    let task = runner
        .config()
        .tasks
        .get(&task_name)
        .ok_or_else(|| ConfigError::TaskNotFound(task_name.clone()))?;

    let invocation = build_invocation(runner.config(), task, task_matches);

    let mut ctx = Context::new()
        .with_config_path(config_path)
        .with_verbosity(get_verbosity(&matches))
        .with_interpreter(select_interpreter(runner.config().interpreter.as_deref()));

    runner.run(&mut ctx, &task_name, &invocation)
}

/// Build the clap command from configuration
fn build_command(config: &Config) -> Command {
    let mut cmd = Command::new(config.name.clone().unwrap_or_else(|| "rask".to_string()))
        .version(crate::VERSION)
        .about(
            config
                .usage
                .clone()
                .unwrap_or_else(|| "A YAML-based task runner".to_string()),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to the rask.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    for (task_name, task) in &config.tasks {
        // Private tasks are not selectable from the command line
        if task.private {
            continue;
        }

        let mut task_cmd = Command::new(task_name.clone())
            .about(task.usage.clone().unwrap_or_default());

        if let Some(desc) = &task.description {
            task_cmd = task_cmd.long_about(desc.clone());
        }

        // Required args are enforced by the resolver, like required
        // options, so a miss exits with the configuration error code
        for (arg_name, arg) in &task.args {
            let mut arg_def = Arg::new(arg_name.clone())
                .value_name(arg_name.to_uppercase())
                .help(arg.usage.clone().unwrap_or_default());

            if let Some(default) = &arg.default {
                arg_def = arg_def.default_value(default.clone());
            }

            task_cmd = task_cmd.arg(arg_def);
        }

        for (opt_name, option) in flag_options(config, task) {
            if option.private {
                continue;
            }

            let mut opt_def = Arg::new(opt_name.clone()).long(opt_name.clone()).help(
                option
                    .usage
                    .clone()
                    .unwrap_or_else(|| format!("Option: {}", opt_name)),
            );

            if let Some(short) = &option.short {
                if let Some(c) = short.chars().next() {
                    opt_def = opt_def.short(c);
                }
            }

            // Boolean flags accept bare presence and an explicit =false
            opt_def = match option.option_type.as_str() {
                "bool" | "boolean" => opt_def
                    .num_args(0..=1)
                    .default_missing_value("true")
                    .require_equals(true)
                    .value_name("BOOL"),
                _ => opt_def.value_name(opt_name.to_uppercase()),
            };

            task_cmd = task_cmd.arg(opt_def);
        }

        cmd = cmd.subcommand(task_cmd);
    }

    cmd
}

/// The options that appear as flags for a task: its own, then the shared
/// options it references
fn flag_options(config: &Config, task: &Task) -> Vec<(String, TaskOption)> {
    let mut options: Vec<(String, TaskOption)> = task
        .options
        .iter()
        .map(|(name, option)| (name.clone(), option.clone()))
        .collect();

    for name in referenced_shared_options(config, task) {
        if let Some(option) = config.options.get(&name) {
            options.push((name, option.clone()));
        }
    }

    options
}

/// Collect the values the user actually supplied on the command line
fn build_invocation(config: &Config, task: &Task, matches: &ArgMatches) -> Invocation {
    let mut invocation = Invocation::default();

    for arg_name in task.args.keys() {
        if let Some(value) = matches.get_one::<String>(arg_name) {
            invocation.args.insert(arg_name.clone(), value.clone());
        }
    }

    for (opt_name, option) in flag_options(config, task) {
        if option.private {
            continue;
        }
        if matches.value_source(&opt_name) != Some(ValueSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<String>(&opt_name) {
            invocation.flags.insert(opt_name.clone(), value.clone());
        }
    }

    invocation
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Extract the --file argument before clap parsing, since the command
/// surface itself depends on the loaded configuration
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if (args[i] == "--file" || args[i] == "-f") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn sample_config() -> Config {
        parse_config(
            r#"
name: sample
usage: Sample application
options:
  environment:
    usage: Deployment environment
    default: staging
tasks:
  greet:
    usage: Say hello
    options:
      name:
        usage: Person to greet
        default: World
      loud:
        type: bool
        short: l
    run: echo "Hello, ${name}!"
  deploy:
    run: echo "deploy to ${environment}"
  hidden:
    private: true
    run: echo "secret"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_private_tasks_get_no_subcommand() {
        let config = sample_config();
        let cmd = build_command(&config);

        let names: Vec<&str> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        assert!(names.contains(&"greet"));
        assert!(names.contains(&"deploy"));
        assert!(!names.contains(&"hidden"));
    }

    #[test]
    fn test_referenced_shared_options_become_flags() {
        let config = sample_config();
        let task = config.tasks.get("deploy").unwrap();

        let names: Vec<String> = flag_options(&config, task)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["environment".to_string()]);
    }

    #[test]
    fn test_build_invocation_collects_only_given_flags() {
        let config = sample_config();
        let cmd = build_command(&config);

        let matches = cmd
            .try_get_matches_from(vec!["sample", "greet", "--name", "Ada"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "greet");

        let task = config.tasks.get("greet").unwrap();
        let invocation = build_invocation(&config, task, sub);
        assert_eq!(invocation.flags.get("name"), Some(&"Ada".to_string()));
        // loud was not supplied, so the resolver decides its value
        assert!(!invocation.flags.contains_key("loud"));
    }

    #[test]
    fn test_boolean_flag_forms() {
        let config = sample_config();
        let cmd = build_command(&config);
        let task = config.tasks.get("greet").unwrap();

        let matches = cmd
            .clone()
            .try_get_matches_from(vec!["sample", "greet", "--loud"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let invocation = build_invocation(&config, task, sub);
        assert_eq!(invocation.flags.get("loud"), Some(&"true".to_string()));

        let matches = cmd
            .try_get_matches_from(vec!["sample", "greet", "--loud=false"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let invocation = build_invocation(&config, task, sub);
        assert_eq!(invocation.flags.get("loud"), Some(&"false".to_string()));
    }

    #[test]
    fn test_missing_required_arg_is_not_a_usage_error() {
        let config = parse_config(
            r#"
tasks:
  greet:
    args:
      person:
        usage: Person to greet
        required: true
    run: echo "${person}"
"#,
        )
        .unwrap();
        let cmd = build_command(&config);

        // The resolver reports the miss; clap must accept the bare invocation
        assert!(cmd.try_get_matches_from(vec!["rask", "greet"]).is_ok());
    }

    #[test]
    fn test_get_verbosity_normal() {
        let cmd = Command::new("test")
            .arg(Arg::new("quiet").long("quiet").action(ArgAction::SetTrue))
            .arg(Arg::new("silent").long("silent").action(ArgAction::SetTrue))
            .arg(Arg::new("verbose").long("verbose").action(ArgAction::SetTrue));
        let matches = cmd.get_matches_from(vec!["test"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_extract_file_arg() {
        let args = vec![
            "rask".to_string(),
            "--file".to_string(),
            "test.yml".to_string(),
        ];
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from("test.yml")));

        let args = vec!["rask".to_string(), "-f".to_string(), "test.yml".to_string()];
        assert_eq!(extract_file_arg(&args), Some(PathBuf::from("test.yml")));

        let args = vec!["rask".to_string(), "greet".to_string()];
        assert_eq!(extract_file_arg(&args), None);
    }
}
