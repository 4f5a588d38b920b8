//! What the runner emits: one report per processed commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::request::AnalysisKind;

/// Whether a commit was analysed normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportStatus {
    Complete,
    /// The commit could not be prepared; `results` is empty.
    Degraded { reason: String },
}

/// Per-file hit count of a pattern search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatches {
    pub path: PathBuf,
    pub matches: usize,
}

/// Kind-specific result data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    FileCount {
        count: usize,
        files: Vec<PathBuf>,
    },
    LineCount {
        language: String,
        lines: u64,
    },
    PatternSearch {
        total: usize,
        files: Vec<FileMatches>,
    },
    Inheritance {
        count: usize,
        types: Vec<String>,
    },
    BuildSettings {
        target: String,
        settings: BTreeMap<String, String>,
    },
}

/// Either a payload or the error that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { payload: Payload },
    Failed { error: String },
}

/// Result of one request at one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub request: String,
    pub kind: AnalysisKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl AnalysisResult {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match &self.outcome {
            Outcome::Ok { payload } => Some(payload),
            Outcome::Failed { .. } => None,
        }
    }
}

/// All results for one commit. Emitted once, never revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub commit: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: ReportStatus,
    pub results: Vec<AnalysisResult>,
}

impl CommitReport {
    #[must_use]
    pub fn degraded(commit: &str, reason: String) -> Self {
        Self {
            commit: commit.to_string(),
            timestamp: None,
            status: ReportStatus::Degraded { reason },
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ReportStatus::Degraded { .. })
    }

    /// Looks up the result of a request by name.
    #[must_use]
    pub fn result(&self, request: &str) -> Option<&AnalysisResult> {
        self.results.iter().find(|r| r.request == request)
    }
}
