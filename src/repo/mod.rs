//! The working-tree boundary: resolve, check out, and normalise commits.

mod git;

pub use git::GitRepository;

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Operations the runner needs from version control.
///
/// All methods act on a single working tree, returned by [`Repository::root`].
/// Implementations are driven from one thread at a time.
pub trait Repository: Send {
    /// Root of the working tree that analyses read.
    fn root(&self) -> &Path;

    /// Hash of the currently checked-out commit.
    ///
    /// # Errors
    /// Returns `Resolution` if no commit is checked out or git fails.
    fn head_hash(&self) -> Result<String>;

    /// Branch checked out at the moment, `None` when `HEAD` is detached.
    ///
    /// # Errors
    /// Returns an error if the repository cannot be queried.
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Checks out `commit` with a detached `HEAD`.
    ///
    /// # Errors
    /// Returns `Checkout` if the commit cannot be checked out.
    fn checkout(&mut self, commit: &str) -> Result<()>;

    /// Puts `branch` back as the checked-out branch.
    ///
    /// # Errors
    /// Returns `Checkout` if the branch cannot be checked out.
    fn switch_branch(&mut self, branch: &str) -> Result<()> {
        self.checkout(branch)
    }

    /// Discards local modifications and untracked files.
    ///
    /// # Errors
    /// Returns `Reset` on failure.
    fn reset_and_clean(&mut self) -> Result<()>;

    /// # Errors
    /// Returns `Repair` on failure.
    fn repair_large_file_pointers(&mut self) -> Result<()>;

    /// # Errors
    /// Returns `Repair` on failure.
    fn sync_submodules(&mut self) -> Result<()>;

    /// Committer timestamp of `commit`.
    ///
    /// # Errors
    /// Returns an error if the commit is unknown.
    fn commit_time(&self, commit: &str) -> Result<DateTime<Utc>>;
}
