//! Thin wrapper over `std::process::Command` that maps failures into
//! [`ExternalError`].

use std::process::{Command, Output, Stdio};

use orchard_core::ExternalError;

/// Run `cmd` to completion, returning trimmed stdout on success.
pub(crate) fn capture(tool: &str, action: &str, cmd: &mut Command) -> Result<String, ExternalError> {
    let output = spawn(tool, action, cmd)?;
    if !output.status.success() {
        return Err(failure(tool, action, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
}

/// Run `cmd` for its exit status. `Ok(true)` on exit 0, `Ok(false)` on exit 1,
/// any other outcome is an error.
pub(crate) fn probe(tool: &str, action: &str, cmd: &mut Command) -> Result<bool, ExternalError> {
    let output = spawn(tool, action, cmd)?;
    match output.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => Err(failure(tool, action, &output)),
    }
}

fn spawn(tool: &str, action: &str, cmd: &mut Command) -> Result<Output, ExternalError> {
    tracing::debug!(tool, action, command = ?cmd, "running");
    cmd.stdin(Stdio::null())
        .output()
        .map_err(|e| ExternalError::new(tool, action, format!("failed to execute {tool}: {e}")))
}

fn failure(tool: &str, action: &str, output: &Output) -> ExternalError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_owned())
        .unwrap_or_else(|| format!("exited with {}", output.status));
    ExternalError::new(tool, action, message)
}
