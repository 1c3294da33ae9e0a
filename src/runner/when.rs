//! When condition evaluation
//!
//! A guard is a list of check-groups that must all pass. Within a group,
//! every present key must pass: `command` and `exists` require every listed
//! entry, `os` matches any listed entry, and the map-shaped keys check
//! every pair.

use crate::config::When;
use crate::error::{ConfigError, RaskError, Result};
use crate::runner::{command, value, Context, Scope};
use std::env;

/// Evaluate a list of check-groups (all must pass)
pub fn evaluate_when_list(when_list: &[When], scope: &Scope, ctx: &Context) -> Result<bool> {
    for when in when_list {
        if !evaluate_when(when, scope, ctx)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate a single check-group (every present key must pass)
pub fn evaluate_when(when: &When, scope: &Scope, ctx: &Context) -> Result<bool> {
    for exec in &when.command {
        if !command::check_command(exec, ctx) {
            return Ok(false);
        }
    }

    for path in &when.exists {
        // IO errors read as absent
        if !ctx.working_dir.join(path).exists() {
            return Ok(false);
        }
    }

    if !when.os.is_empty() {
        let host = normalize_os(env::consts::OS);
        if !when.os.iter().any(|os| normalize_os(os) == host) {
            return Ok(false);
        }
    }

    for (var, expected) in &when.environment {
        let actual = env::var(var).ok();
        if &actual != expected {
            return Ok(false);
        }
    }

    for (name, expected) in &when.equal {
        if option_value(scope, name)? != scalar(name, expected)? {
            return Ok(false);
        }
    }

    for (name, expected) in &when.not_equal {
        if option_value(scope, name)? == scalar(name, expected)? {
            return Ok(false);
        }
    }

    Ok(true)
}

fn option_value<'s>(scope: &'s Scope, name: &str) -> Result<&'s str> {
    scope
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| RaskError::Config(ConfigError::UnknownOption(name.to_string())))
}

fn scalar(name: &str, value: &serde_yaml::Value) -> Result<String> {
    value::scalar_string(value).ok_or_else(|| {
        RaskError::Config(ConfigError::Invalid(format!(
            "Comparison value for option '{}' must be a scalar",
            name
        )))
    })
}

/// Host OS identifiers as other runtimes spell them
fn normalize_os(os: &str) -> String {
    match os.to_ascii_lowercase().as_str() {
        "darwin" | "osx" | "mac" => "macos".to_string(),
        "win" => "windows".to_string(),
        other => other.to_string(),
    }
}
