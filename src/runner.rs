use declarative::{CommandOutput, Error, Result};
use log::trace;
use std::process::{Command, Stdio};

/// Run a command to completion and capture its output
///
/// Only a failure to start the program is an error here; the exit status
/// is left for the caller to interpret.
pub fn run_output(program: &str, args: &[&str], env: &[(&str, &str)]) -> Result<CommandOutput> {
    trace!("exec: {} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .envs(env.iter().copied())
        .stdin(Stdio::null())
        .output()
        .map_err(|source| Error::Invocation {
            program: program.to_string(),
            source,
        })?;
    Ok(output.into())
}

/// Run a command and fail unless it exits successfully
///
/// `resource` and `operation` name what the command was acting on, for the
/// error message.
pub fn run_checked(
    program: &str,
    args: &[&str],
    env: &[(&str, &str)],
    resource: &str,
    operation: &str,
) -> Result<CommandOutput> {
    let output = run_output(program, args, env)?;
    if output.success() {
        return Ok(output);
    }
    Err(Error::command_failed(resource, operation, failure_message(&output)))
}

/// Describe a failed command from its stderr, falling back to the exit status
pub fn failure_message(output: &CommandOutput) -> String {
    let stderr = output.stderr_str();
    let stderr = stderr.trim();
    let status = match output.code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{stderr} ({status})")
    }
}
