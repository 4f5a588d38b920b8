mod command;
mod report;
mod request;

pub use command::CommandResult;
pub use report::{AnalysisResult, CommitReport, FileMatches, Outcome, Payload, ReportStatus};
pub use request::{Analysis, AnalysisKind, CommitRef, MetricRequest, MissingTarget, HEAD};
