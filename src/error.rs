// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrataError {
    /// A symbolic commit (`HEAD`) could not be resolved. Aborts the run.
    #[error("Could not resolve {reference}: {reason}")]
    Resolution { reference: String, reason: String },

    #[error("Checkout of {commit} failed: {reason}")]
    Checkout { commit: String, reason: String },

    #[error("Could not reset working tree: {reason}")]
    Reset { reason: String },

    #[error("Repair step '{step}' failed: {reason}")]
    Repair { step: &'static str, reason: String },

    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// An external tool produced output that does not match its schema.
    #[error("Malformed output from {tool}: {reason}")]
    MalformedOutput { tool: String, reason: String },

    #[error("Parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("{command} exited with code {exit_code}: {stderr}")]
    ToolFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("No target named '{target}' in {project}")]
    MissingTarget {
        project: String,
        target: String,
        fatal: bool,
    },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StrataError {
    /// Fatal errors stop the run; everything else is recorded in the report.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Resolution { .. } => true,
            Self::MissingTarget { fatal, .. } => *fatal,
            _ => false,
        }
    }

    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub(crate) fn malformed(tool: &str, reason: impl Into<String>) -> Self {
        Self::MalformedOutput {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;

// Allow `?` on std::io::Error by converting to StrataError::Io with unknown path.
impl From<std::io::Error> for StrataError {
    fn from(source: std::io::Error) -> Self {
        StrataError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

impl From<walkdir::Error> for StrataError {
    fn from(e: walkdir::Error) -> Self {
        let path = e.path().map(PathBuf::from).unwrap_or_default();
        match e.into_io_error() {
            Some(source) => StrataError::Io { source, path },
            None => StrataError::Analysis("filesystem loop while walking tree".to_string()),
        }
    }
}
