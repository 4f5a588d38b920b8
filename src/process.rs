//! External process execution and output capture.
//!
//! Every external collaborator (git, the line counter, the build-settings tool,
//! the structure parser) goes through here. No timeout is applied: a hung tool
//! stalls the caller.

use crate::error::{Result, StrataError};
use crate::types::CommandResult;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

/// Runs `program` with `args` in `cwd` and captures stdout/stderr.
///
/// A non-zero exit is *not* an error here; see [`run_checked`].
///
/// # Errors
/// Returns `Io` if the process cannot be spawned.
pub fn run<I, S>(program: &str, args: I, cwd: &Path) -> Result<CommandResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let shown = display_command(program, &args);
    debug!(command = %shown, cwd = %cwd.display(), "spawning");

    let start = Instant::now();
    let output = Command::new(program)
        .args(&args)
        .current_dir(cwd)
        .output()
        .map_err(|e| StrataError::io(e, program))?;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let exit_code = output.status.code().unwrap_or(-1);
    debug!(command = %shown, exit_code, duration_ms, "finished");

    Ok(CommandResult::new(
        shown,
        exit_code,
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        duration_ms,
    ))
}

/// Like [`run`], but a non-zero exit becomes `ToolFailed`.
///
/// # Errors
/// Returns `Io` on spawn failure, `ToolFailed` on non-zero exit.
pub fn run_checked<I, S>(program: &str, args: I, cwd: &Path) -> Result<CommandResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let result = run(program, args, cwd)?;
    if result.passed() {
        return Ok(result);
    }
    Err(StrataError::ToolFailed {
        command: result.command().to_string(),
        exit_code: result.exit_code(),
        stderr: result.stderr().trim().to_string(),
    })
}

fn display_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| a.as_ref().to_string_lossy().to_string()));
    parts.join(" ")
}
