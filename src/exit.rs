// src/exit.rs
//! Process exit codes for `strata`.
//!
//! Scripts can tell a clean run from one that finished with degraded commits.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StrataExit {
    /// Every planned commit produced a complete report.
    Success = 0,
    /// Generic error (IO, missing tool, unreadable repository).
    Error = 1,
    /// The run file or arguments were rejected.
    InvalidInput = 2,
    /// The run stopped early: `HEAD` unresolvable or a target missing under `abort`.
    Fatal = 3,
    /// The run finished but at least one report is degraded or has a failed result.
    Degraded = 4,
}

impl StrataExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for StrataExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
