#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("unknown dataset '{value}' in {path}")]
    UnknownDataset { path: PathBuf, value: String },

    #[error("invalid {field} value '{value}' in {path}")]
    InvalidValue {
        path: PathBuf,
        field: String,
        value: String,
    },

    #[error("dataset {dataset} is not declared in the registry")]
    MissingDataset { dataset: String },

    #[error("dataset {dataset} declares no columns")]
    EmptySchema { dataset: String },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
