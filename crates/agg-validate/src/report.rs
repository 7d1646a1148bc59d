//! Per-dataset validation report.

use agg_model::DatasetKind;
use serde::Serialize;

use crate::issue::{Category, Issue, Severity};

/// An issue as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedIssue {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub variable: Option<String>,
    pub message: String,
    pub count: Option<u64>,
    /// Rows this issue removed from the clean table.
    pub rejected_rows: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

impl ReportedIssue {
    pub fn new(issue: &Issue, rejected_rows: usize) -> Self {
        Self {
            rule_id: issue.rule_id(),
            severity: issue.default_severity(),
            category: issue.category(),
            variable: issue.variable().map(str::to_string),
            message: issue.message(),
            count: issue.count(),
            rejected_rows,
            samples: issue.samples().to_vec(),
        }
    }
}

/// Validation report for one dataset table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub dataset: DatasetKind,
    /// Rows in the validated table.
    pub rows: usize,
    /// Distinct rows rejected by any issue.
    pub rejected: usize,
    pub issues: Vec<ReportedIssue>,
}

impl ValidationReport {
    pub fn new(dataset: DatasetKind, rows: usize) -> Self {
        Self {
            dataset,
            rows,
            rejected: 0,
            issues: Vec::new(),
        }
    }

    pub fn add(&mut self, issue: ReportedIssue) {
        self.issues.push(issue);
    }

    fn count_of(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Errors and rejections both need attention before the table is used.
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.severity, Severity::Reject | Severity::Error))
    }

    pub fn reject_count(&self) -> usize {
        self.count_of(Severity::Reject)
    }

    pub fn error_count(&self) -> usize {
        self.count_of(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_of(Severity::Warning)
    }

    /// Rows left after rejection.
    pub fn accepted(&self) -> usize {
        self.rows - self.rejected
    }
}
