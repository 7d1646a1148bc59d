//! JSON validation report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agg_model::DatasetKind;
use agg_validate::{ReportedIssue, ValidationReport};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::atomic::write_text;
use crate::error::Result;

pub const REPORT_SCHEMA: &str = "aggstock.validation-report";
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// A written clean table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

/// Everything known about one processed dataset.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub validation: ValidationReport,
    /// Source rows dropped during normalization, by drop category.
    pub dropped: BTreeMap<String, usize>,
    /// `None` on dry runs.
    pub output: Option<OutputFile>,
}

impl DatasetReport {
    pub fn new(validation: ValidationReport) -> Self {
        Self {
            validation,
            dropped: BTreeMap::new(),
            output: None,
        }
    }

    pub fn with_dropped<K: ToString>(
        mut self,
        counts: impl IntoIterator<Item = (K, usize)>,
    ) -> Self {
        self.dropped = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        self
    }

    pub fn with_output(mut self, output: OutputFile) -> Self {
        self.output = Some(output);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationReportPayload<'a> {
    pub schema: &'static str,
    pub schema_version: u32,
    pub generated_at: String,
    /// Digest of the registry files the tables were checked against.
    pub registry_fingerprint: &'a str,
    pub datasets: Vec<DatasetReportJson<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DatasetReportJson<'a> {
    pub dataset: DatasetKind,
    pub rows: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub dropped: &'a BTreeMap<String, usize>,
    pub reject_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub output: Option<&'a OutputFile>,
    pub issues: &'a [ReportedIssue],
}

impl<'a> ValidationReportPayload<'a> {
    pub fn new(registry_fingerprint: &'a str, reports: &'a [DatasetReport]) -> Self {
        Self {
            schema: REPORT_SCHEMA,
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            registry_fingerprint,
            datasets: reports
                .iter()
                .map(|report| {
                    let validation = &report.validation;
                    DatasetReportJson {
                        dataset: validation.dataset,
                        rows: validation.rows,
                        accepted: validation.accepted(),
                        rejected: validation.rejected,
                        dropped: &report.dropped,
                        reject_count: validation.reject_count(),
                        error_count: validation.error_count(),
                        warning_count: validation.warning_count(),
                        output: report.output.as_ref(),
                        issues: &validation.issues,
                    }
                })
                .collect(),
        }
    }
}

/// Writes the report for all processed datasets as pretty JSON.
pub fn write_validation_report(
    registry_fingerprint: &str,
    reports: &[DatasetReport],
    path: &Path,
) -> Result<PathBuf> {
    let payload = ValidationReportPayload::new(registry_fingerprint, reports);
    let json = serde_json::to_string_pretty(&payload)?;
    write_text(path, &format!("{json}\n"))?;
    info!(path = %path.display(), datasets = reports.len(), "wrote validation report");
    Ok(path.to_path_buf())
}
