//! External process invocation
//!
//! Commands are looked up on PATH with `which` and run to completion on the
//! calling thread. There is no timeout and no retry.

use std::path::PathBuf;
use std::process::Command;

use crate::error::ToolError;

/// Locate a command on PATH (or accept a path to an executable)
pub fn find_command(command: &str) -> Result<PathBuf, ToolError> {
    which::which(command).map_err(|_| ToolError::CommandNotFound {
        command: command.to_string(),
    })
}

/// Whether a command can be found
pub fn is_available(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Run a command with inherited stdio and return its exit status.
///
/// A process killed by a signal reports status 1.
pub fn run_status(command: &mut Command) -> Result<i32, ToolError> {
    let program = describe(command);
    tracing::info!("Running {program}");
    let status = command.status().map_err(|e| ToolError::Spawn {
        command: program.clone(),
        error: e.to_string(),
    })?;
    let code = status.code().unwrap_or(1);
    if code != 0 {
        tracing::debug!("{program} exited with status {code}");
    }
    Ok(code)
}

/// Run a query command and return its trimmed stdout.
///
/// A non-zero exit is an error: the caller needs the answer.
pub fn run_query(command: &mut Command) -> Result<String, ToolError> {
    let program = describe(command);
    tracing::debug!("Querying {program}");
    let output = command.output().map_err(|e| ToolError::Spawn {
        command: program.clone(),
        error: e.to_string(),
    })?;
    if !output.status.success() {
        return Err(ToolError::QueryFailed {
            command: program,
            status: output.status.code().unwrap_or(1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
