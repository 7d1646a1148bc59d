//! Error types for normalization.

use std::path::PathBuf;

use agg_ingest::IngestError;
use agg_model::DatasetKind;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that stop a dataset from being normalized at all.
///
/// Problems with individual rows are not errors; they are reported as
/// [`RowDrop`](crate::RowDrop)s.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading or joining the raw sources failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A column the dataset rules depend on is absent from a source table.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// No source table was discovered for the dataset.
    #[error("no source files found for dataset {dataset}")]
    NoSources { dataset: DatasetKind },

    /// Building the clean frame failed.
    #[error("dataframe error: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        TransformError::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
