//! Output writers for aggstock.
//!
//! - **Clean tables**: CSV in canonical column order ([`write_clean_csv`])
//! - **Validation report**: JSON summary of every processed dataset
//!   ([`write_validation_report`])
//!
//! Files are written to `<path>.tmp` and renamed into place, so an
//! interrupted run never leaves a truncated table behind.

mod atomic;
mod csv;
mod error;
mod report;

pub use atomic::{file_sha256, temp_path};
pub use csv::{canonical_frame, output_file_name, write_clean_csv};
pub use error::{OutputError, Result};
pub use report::{
    DatasetReport, DatasetReportJson, OutputFile, REPORT_SCHEMA, REPORT_SCHEMA_VERSION,
    ValidationReportPayload, write_validation_report,
};

use std::path::Path;

use agg_model::DatasetSchema;
use polars::prelude::DataFrame;

/// Orders, writes and fingerprints a dataset's clean table under `dir`.
pub fn write_dataset_table(
    schema: &DatasetSchema,
    df: &DataFrame,
    dir: &Path,
) -> Result<OutputFile> {
    let path = dir.join(output_file_name(schema));
    let mut ordered = canonical_frame(schema, df).map_err(|source| OutputError::Csv {
        path: path.clone(),
        source,
    })?;
    write_clean_csv(&mut ordered, &path)?;
    Ok(OutputFile {
        sha256: file_sha256(&path)?,
        rows: ordered.height(),
        path,
    })
}
