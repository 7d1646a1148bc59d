//! Reading the standards CSV files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::{Result, StandardsError};

/// Environment variable for overriding the standards directory.
pub const STANDARDS_ENV_VAR: &str = "AGGSTOCK_STANDARDS_DIR";

/// Standards directory: `AGGSTOCK_STANDARDS_DIR` when set, otherwise
/// `standards/` at the workspace root.
pub fn default_standards_root() -> PathBuf {
    std::env::var_os(STANDARDS_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../standards"))
}

/// One row of a standards file, keyed by trimmed header.
#[derive(Debug, Clone, Default)]
pub struct StandardsRow {
    line: u64,
    fields: BTreeMap<String, String>,
}

impl StandardsRow {
    /// 1-based line in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Field text, "" when the column is absent.
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    /// Field text, `None` when absent or empty.
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

pub fn read_standards_rows(path: &Path) -> Result<Vec<StandardsRow>> {
    let csv_error = |err: csv::Error| StandardsError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let file = std::fs::File::open(path).map_err(|e| StandardsError::io(path, e))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    reader
        .records()
        .map(|record| -> Result<StandardsRow> {
            let record = record.map_err(csv_error)?;
            let line = record.position().map_or(0, |p| p.line());
            let fields = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.trim().to_string()))
                .collect();
            Ok(StandardsRow { line, fields })
        })
        .collect()
}
