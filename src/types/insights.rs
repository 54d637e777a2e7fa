use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const REPORT_TYPE_BUG: &str = "BUG";
pub const ANNOTATION_TYPE_BUG: &str = "BUG";

/// Identifier the remote API assigned to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportId(pub Uuid);

/// Identifier the remote API assigned to a single annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationId(pub Uuid);

impl ReportId {
    /// URL segment form, `{uuid}`.
    pub fn braced(&self) -> String {
        self.0.braced().to_string()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportResult {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPayload {
    pub title: String,
    pub details: String,
    pub report_type: &'static str,
    pub result: ReportResult,
}

impl ReportPayload {
    pub fn new(title: impl Into<String>, issue_count: usize) -> Self {
        let (details, result) = if issue_count > 0 {
            (
                format!("This PR introduces {issue_count} new issue(s)."),
                ReportResult::Failed,
            )
        } else {
            (
                "This PR introduces no new issues.".to_string(),
                ReportResult::Passed,
            )
        };
        Self {
            title: title.into(),
            details,
            report_type: REPORT_TYPE_BUG,
            result,
        }
    }
}

/// One issue to attach to a report, before path normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub summary: String,
    pub path: Option<String>,
    pub line: Option<u32>,
}

impl Annotation {
    pub fn new(summary: impl Into<String>, path: Option<String>, line: Option<u32>) -> Self {
        Self {
            summary: summary.into(),
            path,
            line,
        }
    }
}

/// Wire shape of an annotation. Absent fields are left out of the JSON
/// entirely rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationPayload {
    pub annotation_type: &'static str,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}
