//! What the caller asks for: one analysis against a list of commits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The symbolic token for "currently checked-out commit".
pub const HEAD: &str = "HEAD";

/// A commit as written by the caller, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommitRef {
    /// The `HEAD` sentinel; resolved once per run.
    Head,
    /// A concrete commit hash (or any revision git accepts verbatim).
    Hash(String),
}

impl CommitRef {
    #[must_use]
    pub fn is_head(&self) -> bool {
        matches!(self, Self::Head)
    }
}

impl From<String> for CommitRef {
    fn from(s: String) -> Self {
        if s == HEAD {
            Self::Head
        } else {
            Self::Hash(s)
        }
    }
}

impl From<&str> for CommitRef {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<CommitRef> for String {
    fn from(r: CommitRef) -> Self {
        match r {
            CommitRef::Head => HEAD.to_string(),
            CommitRef::Hash(h) => h,
        }
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str(HEAD),
            Self::Hash(h) => f.write_str(h),
        }
    }
}

/// What to do when a build-settings request names a target the project lacks.
///
/// There is deliberately no default: every request has to pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTarget {
    /// Stop the whole run after the current commit's report.
    Abort,
    /// Record an empty settings map.
    Empty,
}

/// Discriminant of [`Analysis`], used to label results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    FileCount,
    LineCount,
    PatternSearch,
    Inheritance,
    BuildSettings,
}

impl AnalysisKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FileCount => "file_count",
            Self::LineCount => "line_count",
            Self::PatternSearch => "pattern_search",
            Self::Inheritance => "inheritance",
            Self::BuildSettings => "build_settings",
        }
    }
}

/// An analysis kind together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    /// Count files whose extension equals `extension` (no leading dot).
    FileCount {
        extension: String,
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Ask the external line counter for the code lines of `language` under `path`.
    LineCount {
        language: String,
        #[serde(default = "default_path")]
        path: PathBuf,
    },
    /// Count regex matches in files with one of `extensions` (all files when empty).
    PatternSearch {
        pattern: String,
        #[serde(default)]
        extensions: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Count declarations that transitively inherit from `base` (`Base<*>` allowed).
    Inheritance {
        base: String,
        #[serde(default = "default_source_extensions")]
        extensions: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
    /// Extract build settings of one target/configuration.
    BuildSettings {
        project: PathBuf,
        target: String,
        #[serde(default = "default_configuration")]
        configuration: String,
        #[serde(default)]
        keys: Vec<String>,
        on_missing_target: MissingTarget,
    },
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_extensions() -> Vec<String> {
    vec!["swift".to_string()]
}

fn default_configuration() -> String {
    "Release".to_string()
}

impl Analysis {
    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::FileCount { .. } => AnalysisKind::FileCount,
            Self::LineCount { .. } => AnalysisKind::LineCount,
            Self::PatternSearch { .. } => AnalysisKind::PatternSearch,
            Self::Inheritance { .. } => AnalysisKind::Inheritance,
            Self::BuildSettings { .. } => AnalysisKind::BuildSettings,
        }
    }
}

/// One analysis applied to an ordered list of commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRequest {
    pub name: String,
    pub analysis: Analysis,
    pub commits: Vec<CommitRef>,
}

impl MetricRequest {
    #[must_use]
    pub fn new(name: impl Into<String>, analysis: Analysis, commits: Vec<CommitRef>) -> Self {
        Self {
            name: name.into(),
            analysis,
            commits,
        }
    }

    #[must_use]
    pub fn references_head(&self) -> bool {
        self.commits.iter().any(CommitRef::is_head)
    }
}
