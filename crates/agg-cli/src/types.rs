use std::path::PathBuf;

use agg_model::DatasetKind;
use agg_output::DatasetReport;
use agg_validate::ValidationReport;

/// One dataset processed by `prepare`.
#[derive(Debug, Clone)]
pub struct DatasetRun {
    pub kind: DatasetKind,
    pub label: String,
    /// Source files read, including the address file for mines.
    pub files: usize,
    pub source_rows: usize,
    /// Records produced by normalization, before validation.
    pub records: usize,
    pub report: DatasetReport,
}

impl DatasetRun {
    pub fn validation(&self) -> &ValidationReport {
        &self.report.validation
    }

    pub fn dropped(&self) -> usize {
        self.report.dropped.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct PrepareResult {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub datasets: Vec<DatasetRun>,
    /// Selected datasets with no source files in the data folder.
    pub skipped: Vec<DatasetKind>,
    /// Datasets that failed outright, as display strings.
    pub errors: Vec<String>,
    pub report_path: Option<PathBuf>,
}

impl PrepareResult {
    pub fn has_validation_errors(&self) -> bool {
        self.datasets.iter().any(|run| run.validation().has_errors())
    }
}

#[derive(Debug, Clone)]
pub struct ValidateResult {
    pub path: PathBuf,
    pub report: DatasetReport,
    pub report_path: Option<PathBuf>,
}
