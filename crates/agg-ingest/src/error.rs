//! Errors raised while reading source files.

use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory {path} does not exist")]
    DirectoryNotFound { path: PathBuf },

    #[error("cannot list {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source file {path} does not exist")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reader gave up on the file; malformed rows alone never raise this.
    #[error("{path} is not readable as CSV: {message}")]
    CsvParse { path: PathBuf, message: String },

    #[error("{path} has no header row")]
    EmptyCsv { path: PathBuf },

    #[error("unsupported encoding {encoding} in {path}; save the file as UTF-8")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// A column the loader joins or filters on is absent.
    #[error("{path} has no '{column}' column")]
    MissingColumn { column: String, path: PathBuf },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl IngestError {
    pub(crate) fn open(path: &Path, source: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            _ => Self::FileRead { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
