//! Command execution
//!
//! All shell commands go through the configured interpreter as
//! `<interpreter> -c <command>`. Run-item commands inherit the standard
//! streams; `when` probes are silent; default-clause producers capture
//! stdout.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Context;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};

/// Build a child process invocation for a shell command string
fn shell_command(exec: &str, ctx: &Context) -> StdCommand {
    let mut command = StdCommand::new(&ctx.interpreter[0]);

    if ctx.interpreter.len() > 1 {
        command.args(&ctx.interpreter[1..]);
    }

    command.arg(exec);
    command.current_dir(&ctx.working_dir);
    command
}

/// Execute a command, inheriting the standard streams
///
/// A non-zero exit aborts with the child's code.
pub fn execute_command(exec: &str, dir: Option<&str>, ctx: &Context) -> ExecutionResult<()> {
    let mut command = shell_command(exec, ctx);

    if let Some(dir) = dir {
        command.current_dir(ctx.working_dir.join(Path::new(dir)));
    }

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command
        .status()
        .map_err(|_| ExecutionError::CommandFailed(None))?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed(status.code()));
    }

    Ok(())
}

/// Check whether a command succeeds, for `when` guards
///
/// Output is suppressed, and any spawn error counts as a plain false.
pub fn check_command(exec: &str, ctx: &Context) -> bool {
    let mut command = shell_command(exec, ctx);

    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    match command.status() {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

/// Run a command and capture its stdout, for default-clause producers
///
/// A single trailing newline is trimmed; a non-zero exit aborts.
pub fn capture_command(exec: &str, ctx: &Context) -> ExecutionResult<String> {
    let mut command = shell_command(exec, ctx);

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::inherit());

    let output = command
        .output()
        .map_err(|_| ExecutionError::CommandFailed(None))?;

    if !output.status.success() {
        return Err(ExecutionError::CommandFailed(output.status.code()));
    }

    let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.ends_with('\n') {
        stdout.pop();
        if stdout.ends_with('\r') {
            stdout.pop();
        }
    }

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_simple_command() {
        let ctx = Context::new();
        assert!(execute_command("true", None, &ctx).is_ok());
    }

    #[test]
    fn test_execute_failing_command() {
        let ctx = Context::new();
        let result = execute_command("exit 3", None, &ctx);
        assert!(matches!(
            result,
            Err(ExecutionError::CommandFailed(Some(3)))
        ));
    }

    #[test]
    fn test_execute_command_in_dir() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let ctx = Context::new().with_working_dir(temp_dir.path().to_path_buf());
        execute_command("touch marker", Some("sub"), &ctx).unwrap();

        assert!(temp_dir.path().join("sub/marker").exists());
    }

    #[test]
    fn test_check_command() {
        let ctx = Context::new();
        assert!(check_command("true", &ctx));
        assert!(!check_command("false", &ctx));
    }

    #[test]
    fn test_capture_command_trims_one_newline() {
        let ctx = Context::new();
        assert_eq!(capture_command("echo captured", &ctx).unwrap(), "captured");
        assert_eq!(
            capture_command("printf 'two\\n\\n'", &ctx).unwrap(),
            "two\n"
        );
    }

    #[test]
    fn test_capture_command_failure() {
        let ctx = Context::new();
        let result = capture_command("exit 2", &ctx);
        assert!(matches!(
            result,
            Err(ExecutionError::CommandFailed(Some(2)))
        ));
    }
}
