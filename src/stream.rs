// src/stream.rs
//! Output stream: reports delivered as soon as each commit finishes.

use crate::error::{Result, StrataError};
use crate::plan::CommitBatch;
use crate::repo::Repository;
use crate::runner::{AnalysisRunner, CancellationToken, RunSummary};
use crate::types::CommitReport;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Receiving end of a run executing on a background thread.
///
/// Iterating yields reports in batch order and ends when the run does;
/// [`ReportStream::finish`] then returns the run's summary or its fatal error.
pub struct ReportStream {
    rx: Receiver<CommitReport>,
    handle: JoinHandle<Result<RunSummary>>,
    cancel: CancellationToken,
}

impl ReportStream {
    /// Starts `runner` over `batch` on a new thread.
    #[must_use]
    pub fn spawn<R>(mut runner: AnalysisRunner<R>, batch: CommitBatch) -> Self
    where
        R: Repository + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = runner.cancellation_token();
        let on_drop = cancel.clone();
        let handle = thread::spawn(move || {
            runner.run(batch, |report| {
                if tx.send(report).is_err() && !on_drop.is_cancelled() {
                    debug!("report receiver dropped, cancelling run");
                    on_drop.cancel();
                }
            })
        });
        Self { rx, handle, cancel }
    }

    /// Token that stops the run before its next commit.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to end and returns how it ended.
    ///
    /// Reports not yet consumed are discarded, and the run stops before the
    /// next commit once it notices nobody is listening.
    ///
    /// # Errors
    /// Returns the run's fatal error, or `Analysis` if the runner thread panicked.
    pub fn finish(self) -> Result<RunSummary> {
        drop(self.rx);
        self.handle
            .join()
            .map_err(|_| StrataError::Analysis("runner thread panicked".to_string()))?
    }
}

impl ReportStream {
    /// Hands every report to `sink` until the run ends or `sink` fails.
    ///
    /// A failing sink cancels the run and waits for it to stop before its
    /// error is returned, so no checkout is left half-done.
    ///
    /// # Errors
    /// The outer error is the sink's; the inner result is [`ReportStream::finish`].
    pub fn drain<E, F>(mut self, mut sink: F) -> std::result::Result<Result<RunSummary>, E>
    where
        F: FnMut(CommitReport) -> std::result::Result<(), E>,
    {
        while let Some(report) = self.next() {
            if let Err(e) = sink(report) {
                self.cancel.cancel();
                if let Err(run_err) = self.finish() {
                    warn!(error = %run_err, "run ended with an error after the sink failed");
                }
                return Err(e);
            }
        }
        Ok(self.finish())
    }
}

impl Iterator for ReportStream {
    type Item = CommitReport;

    fn next(&mut self) -> Option<CommitReport> {
        self.rx.recv().ok()
    }
}

#[derive(Deserialize)]
struct WrittenCommit {
    commit: String,
}

/// Appends reports to a JSON-lines file, once per commit.
///
/// Owned by the consumer of a [`ReportStream`]; each report received is one
/// append, so everything emitted before an interruption stays on disk.
#[derive(Debug)]
pub struct JsonLinesWriter {
    path: PathBuf,
    written: HashSet<String>,
    /// The file ends in a partial line that the next append must terminate.
    torn_tail: bool,
}

impl JsonLinesWriter {
    /// A writer that treats the file as new (existing lines are kept, not read).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: HashSet::new(),
            torn_tail: false,
        }
    }

    /// A writer that remembers the commits already present in `path`.
    ///
    /// Lines that do not parse (e.g. a write cut short) are skipped.
    ///
    /// # Errors
    /// Returns `Io` if the file exists but cannot be read.
    pub fn resume(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut written = HashSet::new();
        let mut torn_tail = false;
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StrataError::io(e, &path))?;
            torn_tail = !content.is_empty() && !content.ends_with('\n');
            for (idx, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<WrittenCommit>(line) {
                    Ok(w) => {
                        written.insert(w.commit);
                    }
                    Err(e) => warn!(line = idx + 1, error = %e, "skipping unreadable report line"),
                }
            }
        }
        Ok(Self {
            path,
            written,
            torn_tail,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commits already on disk.
    #[must_use]
    pub fn written(&self) -> &HashSet<String> {
        &self.written
    }

    /// Appends `report` unless its commit was already written.
    ///
    /// Returns whether a line was written.
    ///
    /// # Errors
    /// Returns `Io` or `Json` if the line cannot be written.
    pub fn append(&mut self, report: &CommitReport) -> Result<bool> {
        if self.written.contains(&report.commit) {
            return Ok(false);
        }
        let mut line = if self.torn_tail {
            String::from("\n")
        } else {
            String::new()
        };
        line.push_str(&serde_json::to_string(report)?);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StrataError::io(e, &self.path))?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| StrataError::io(e, &self.path))?;

        self.torn_tail = false;
        self.written.insert(report.commit.clone());
        Ok(true)
    }
}
