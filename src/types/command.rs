//! Result of an external command execution.

use serde::Serialize;

/// Result of an external command execution.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// The command that was executed (display form).
    command: String,
    /// Process exit code (-1 if unavailable, e.g., killed by signal).
    exit_code: i32,
    /// Standard output.
    stdout: String,
    /// Standard error.
    stderr: String,
    /// Execution time in milliseconds.
    duration_ms: u64,
}

impl CommandResult {
    /// Creates a new command result.
    #[must_use]
    pub fn new(
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
        duration_ms: u64,
    ) -> Self {
        Self {
            command,
            exit_code,
            stdout,
            stderr,
            duration_ms,
        }
    }

    /// The command that was executed.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the command succeeded (exit code 0).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }

    /// Process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Execution time in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}
