//! Metadata-driven validation of clean dataset tables.
//!
//! Checks are derived from the registry schema: declared columns, required
//! designations, column types, bounds and key columns. Issues with
//! [`Severity::Reject`] (and duplicate keys after their first occurrence)
//! mark rows that are removed before export; the remaining issues only
//! appear in the report.

mod checks;
mod issue;
mod report;
mod util;

use std::collections::BTreeSet;

use agg_model::{DatasetSchema, ValidationOptions};
use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, PolarsResult};
use tracing::{debug, info, info_span};

pub use issue::{Category, Issue, Severity};
pub use report::{ReportedIssue, ValidationReport};
pub use util::CaseInsensitiveSet;

/// Report plus the row indices to drop from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub rejected_rows: BTreeSet<usize>,
}

impl ValidationOutcome {
    /// One flag per row, `true` for rows that survive validation.
    pub fn accepted_mask(&self, height: usize) -> Vec<bool> {
        (0..height)
            .map(|idx| !self.rejected_rows.contains(&idx))
            .collect()
    }

    /// The validated table without its rejected rows.
    pub fn accepted_frame(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        if self.rejected_rows.is_empty() {
            return Ok(df.clone());
        }
        let mask = BooleanChunked::from_slice("accepted".into(), &self.accepted_mask(df.height()));
        df.filter(&mask)
    }
}

/// Validate a clean table against its schema.
pub fn validate_dataset(
    schema: &DatasetSchema,
    df: &DataFrame,
    options: &ValidationOptions,
) -> ValidationOutcome {
    let span = info_span!("validate", dataset = %schema.kind);
    let _guard = span.enter();

    let ctx = checks::CheckContext::new(schema, df, options);
    let mut report = ValidationReport::new(schema.kind, df.height());
    let mut rejected_rows = BTreeSet::new();

    for finding in checks::run_all(&ctx) {
        debug!(
            rule = finding.issue.rule_id(),
            rows = finding.rows.len(),
            "{}",
            finding.issue.message()
        );
        report.add(ReportedIssue::new(&finding.issue, finding.rows.len()));
        rejected_rows.extend(finding.rows);
    }
    report
        .issues
        .sort_by(|a, b| a.severity.cmp(&b.severity).then(a.rule_id.cmp(b.rule_id)));
    report.rejected = rejected_rows.len();

    info!(
        rows = report.rows,
        rejected = report.rejected,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation complete"
    );
    ValidationOutcome {
        report,
        rejected_rows,
    }
}
