// src/runner.rs
//! Drives each planned commit through checkout, repair, dispatch and emit.
//!
//! Commits are processed strictly one after another because the working tree
//! is shared. Requests at the same commit run in parallel; each only reads the
//! tree and fills its own result slot.

use crate::analysis::{self, Toolbox};
use crate::config::RepairPolicy;
use crate::error::{Result, StrataError};
use crate::plan::{BatchEntry, CommitBatch};
use crate::repo::Repository;
use crate::types::{AnalysisResult, CommitReport, Outcome, ReportStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooperative stop signal, observed only between commits.
///
/// Cancelling never interrupts a checkout or analysis already in flight, and
/// never kills an external process; the run stops before the next checkout.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a commit currently is in its processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Checkout,
    Repair,
    Dispatch,
    Collect,
    Emit,
    Failed,
}

/// Totals for a finished (or cancelled) run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Reports emitted, degraded ones included.
    pub processed: usize,
    pub degraded: usize,
    /// Commits left unprocessed because of cancellation.
    pub skipped: usize,
    pub cancelled: bool,
}

/// Where to put the working tree back after a run.
#[derive(Debug, Clone)]
enum Position {
    Branch(String),
    Detached(String),
}

/// Sequential per-commit pipeline over a [`Repository`].
pub struct AnalysisRunner<R> {
    repo: R,
    toolbox: Toolbox,
    repair: RepairPolicy,
    restore_head: bool,
    cancel: CancellationToken,
    phase: Phase,
}

impl<R: Repository> AnalysisRunner<R> {
    #[must_use]
    pub fn new(repo: R, toolbox: Toolbox) -> Self {
        Self {
            repo,
            toolbox,
            repair: RepairPolicy::default(),
            restore_head: false,
            cancel: CancellationToken::new(),
            phase: Phase::Idle,
        }
    }

    #[must_use]
    pub fn with_repair(mut self, repair: RepairPolicy) -> Self {
        self.repair = repair;
        self
    }

    /// Check the pre-run `HEAD` back out when the run ends.
    #[must_use]
    pub fn with_restore_head(mut self, restore: bool) -> Self {
        self.restore_head = restore;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Processes every commit of `batch` in order, handing each report to `emit`.
    ///
    /// # Errors
    /// Returns a fatal analysis error (a `MissingTarget` under the abort
    /// policy). The report of the commit that raised it is emitted first.
    pub fn run<F>(&mut self, batch: CommitBatch, mut emit: F) -> Result<RunSummary>
    where
        F: FnMut(CommitReport),
    {
        let original = if self.restore_head {
            self.original_position()
        } else {
            None
        };

        let result = self.run_batch(batch, &mut emit);

        if let Some(position) = original {
            let restored = match &position {
                Position::Branch(branch) => self.repo.switch_branch(branch),
                Position::Detached(hash) => self.repo.checkout(hash),
            };
            if let Err(e) = restored {
                warn!(?position, error = %e, "could not restore original HEAD");
            }
        }
        self.enter(Phase::Idle);
        result
    }

    fn original_position(&self) -> Option<Position> {
        match self.repo.current_branch() {
            Ok(Some(branch)) => return Some(Position::Branch(branch)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read current branch"),
        }
        self.repo.head_hash().ok().map(Position::Detached)
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase");
        }
        self.phase = phase;
    }

    fn run_batch<F>(&mut self, batch: CommitBatch, emit: &mut F) -> Result<RunSummary>
    where
        F: FnMut(CommitReport),
    {
        let total = batch.len();
        let mut summary = RunSummary::default();

        for (idx, entry) in batch.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = total - idx, "run cancelled");
                summary.cancelled = true;
                summary.skipped = total - idx;
                break;
            }
            info!(commit = %entry.commit, position = idx + 1, total, "processing commit");

            let (report, fatal) = self.process(&entry);
            summary.processed += 1;
            if report.is_degraded() {
                summary.degraded += 1;
            }

            self.enter(Phase::Emit);
            emit(report);
            self.enter(Phase::Idle);

            if let Some(err) = fatal {
                warn!(
                    commit = %entry.commit,
                    remaining = total - idx - 1,
                    error = %err,
                    "fatal analysis error, stopping run"
                );
                return Err(err);
            }
        }
        Ok(summary)
    }

    /// Runs one commit; returns its report and a fatal error, if any.
    fn process(&mut self, entry: &BatchEntry) -> (CommitReport, Option<StrataError>) {
        let commit = entry.commit.as_str();

        self.enter(Phase::Checkout);
        if let Err(e) = self.checkout(commit) {
            self.enter(Phase::Failed);
            warn!(commit, error = %e, "checkout failed, emitting degraded report");
            return (CommitReport::degraded(commit, e.to_string()), None);
        }

        self.enter(Phase::Repair);
        if let Err(e) = self.repair() {
            if self.repair.required {
                self.enter(Phase::Failed);
                warn!(commit, error = %e, "required repair failed, emitting degraded report");
                return (CommitReport::degraded(commit, e.to_string()), None);
            }
            warn!(commit, error = %e, "repair failed, continuing");
        }

        let timestamp = match self.repo.commit_time(commit) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(commit, error = %e, "no commit timestamp");
                None
            }
        };

        self.enter(Phase::Dispatch);
        let root = self.repo.root();
        let toolbox = &self.toolbox;
        let outcomes: Vec<Result<_>> = entry
            .requests
            .par_iter()
            .map(|request| {
                debug!(commit, request = %request.name, kind = request.analysis.kind().label(), "dispatch");
                analysis::run(&request.analysis, root, toolbox)
            })
            .collect();

        self.enter(Phase::Collect);
        let mut fatal = None;
        let mut results = Vec::with_capacity(outcomes.len());
        for (request, outcome) in entry.requests.iter().zip(outcomes) {
            let outcome = match outcome {
                Ok(payload) => Outcome::Ok { payload },
                Err(e) => {
                    warn!(commit, request = %request.name, error = %e, "analysis failed");
                    let error = e.to_string();
                    if e.is_fatal() && fatal.is_none() {
                        fatal = Some(e);
                    }
                    Outcome::Failed { error }
                }
            };
            results.push(AnalysisResult {
                request: request.name.clone(),
                kind: request.analysis.kind(),
                outcome,
            });
        }

        let report = CommitReport {
            commit: commit.to_string(),
            timestamp,
            status: ReportStatus::Complete,
            results,
        };
        (report, fatal)
    }

    fn checkout(&mut self, commit: &str) -> Result<()> {
        self.repo.reset_and_clean()?;
        self.repo.checkout(commit)
    }

    /// Runs every enabled step, even after one fails; returns the first failure.
    fn repair(&mut self) -> Result<()> {
        let mut first = None;
        if self.repair.large_file_pointers {
            if let Err(e) = self.repo.repair_large_file_pointers() {
                warn!(error = %e, "large-file pointer repair failed");
                first.get_or_insert(e);
            }
        }
        if self.repair.submodules {
            if let Err(e) = self.repo.sync_submodules() {
                warn!(error = %e, "submodule sync failed");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
