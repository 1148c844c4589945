//! Per-request results of a session run.

use super::error::RunError;
use crate::models::Outcome;
use serde_json::Value;

/// How a request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Passed,
    Failed(RunError),
    /// Not executed because of `@skip`, or because another request carries
    /// `@only`.
    Skipped,
}

/// What happened to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestReport {
    /// `@title`, or `METHOD <url>`.
    pub title: String,

    /// 1-based line of the request line.
    pub line: usize,

    /// `@name` of the request, if any.
    pub name: Option<String>,

    pub status: ReportStatus,

    /// The exchange, when the request got as far as a response.
    pub outcome: Option<Outcome>,

    /// The outcome with ignored headers and `@ignore` paths redacted, ready
    /// for snapshot comparison.
    pub snapshot: Option<Value>,
}

impl RequestReport {
    pub fn passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    pub fn skipped(&self) -> bool {
        self.status == ReportStatus::Skipped
    }

    pub fn error(&self) -> Option<&RunError> {
        match &self.status {
            ReportStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Counts of passed, failed, and skipped requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[RequestReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            match report.status {
                ReportStatus::Passed => summary.passed += 1,
                ReportStatus::Failed(_) => summary.failed += 1,
                ReportStatus::Skipped => summary.skipped += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
