//! Configuration options for dataset preparation.
//!
//! `PrepareOptions` can be loaded from a TOML file; every field has a
//! default so a partial file is enough.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::error::{ModelError, Result};

/// How a raw CSV file is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Number of physical records to discard before the header or data.
    pub skip_rows: usize,
    /// When false, columns are named `column_1`, `column_2`, ...
    pub has_headers: bool,
    /// Drop columns whose every cell is empty.
    pub drop_empty_columns: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            has_headers: true,
            drop_empty_columns: false,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headerless(mut self) -> Self {
        self.has_headers = false;
        self
    }

    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn with_drop_empty_columns(mut self, enable: bool) -> Self {
        self.drop_empty_columns = enable;
        self
    }
}

/// Tolerances applied by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Allowed relative difference between reported and derived apparent
    /// consumption.
    pub balance_tolerance: f64,
    /// Absolute difference always accepted, for values near zero.
    pub balance_floor: f64,
    /// Maximum sample values kept per issue.
    pub max_samples: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            balance_tolerance: 0.01,
            balance_floor: 1.0,
            max_samples: 5,
        }
    }
}

/// Census geocoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeOptions {
    pub enabled: bool,
    pub endpoint: String,
    pub benchmark: String,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub pause_ms: u64,
    pub timeout_secs: u64,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://geocoding.geo.census.gov/geocoder/locations/onelineaddress"
                .to_string(),
            benchmark: "Public_AR_Current".to_string(),
            retries: 3,
            retry_delay_ms: 1000,
            pause_ms: 100,
            timeout_secs: 10,
        }
    }
}

/// Options controlling a `prepare` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    /// Restrict the run to these datasets. Empty means all.
    pub datasets: Vec<DatasetKind>,
    pub output_dir: Option<PathBuf>,
    /// Validate and report without writing outputs.
    pub dry_run: bool,
    /// Return a failing status when any dataset has validation errors.
    pub fail_on_errors: bool,
    pub validation: ValidationOptions,
    pub geocode: GeocodeOptions,
}

impl PrepareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = toml::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        options.check()?;
        Ok(options)
    }

    fn check(&self) -> Result<()> {
        let tolerance = self.validation.balance_tolerance;
        if !(0.0..1.0).contains(&tolerance) {
            return Err(ModelError::InvalidOption {
                name: "validation.balance_tolerance".to_string(),
                message: format!("expected a fraction in [0, 1), got {tolerance}"),
            });
        }
        let floor = self.validation.balance_floor;
        if !floor.is_finite() || floor < 0.0 {
            return Err(ModelError::InvalidOption {
                name: "validation.balance_floor".to_string(),
                message: format!("expected a non-negative number, got {floor}"),
            });
        }
        if self.geocode.retries == 0 {
            return Err(ModelError::InvalidOption {
                name: "geocode.retries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// True when `kind` is selected by this run.
    pub fn includes(&self, kind: DatasetKind) -> bool {
        self.datasets.is_empty() || self.datasets.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "datasets = [\"clinker\", \"consumption\"]\n\n[validation]\nbalance_tolerance = 0.05"
        )
        .unwrap();
        let options = PrepareOptions::from_toml_file(file.path()).unwrap();
        assert_eq!(
            options.datasets,
            vec![DatasetKind::Clinker, DatasetKind::Consumption]
        );
        assert_eq!(options.validation.balance_tolerance, 0.05);
        assert_eq!(options.validation.balance_floor, 1.0);
        assert_eq!(options.geocode.retries, 3);
        assert!(options.includes(DatasetKind::Clinker));
        assert!(!options.includes(DatasetKind::Mine));
    }

    #[test]
    fn rejects_out_of_range_tolerance() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\nbalance_tolerance = 2.0").unwrap();
        let err = PrepareOptions::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidOption { .. }));
    }

    #[test]
    fn rejects_negative_or_nan_balance_floor() {
        for floor in ["-1.0", "nan"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "[validation]\nbalance_floor = {floor}").unwrap();
            let err = PrepareOptions::from_toml_file(file.path()).unwrap_err();
            assert!(
                matches!(
                    err,
                    ModelError::InvalidOption { ref name, .. }
                        if name == "validation.balance_floor"
                ),
                "{floor}: {err}"
            );
        }
    }

    #[test]
    fn missing_file_is_config_read_error() {
        let err = PrepareOptions::from_toml_file(Path::new("/nonexistent/aggstock.toml"))
            .unwrap_err();
        assert!(matches!(err, ModelError::ConfigRead { .. }));
    }

    #[test]
    fn empty_selection_includes_everything() {
        let options = PrepareOptions::new();
        assert!(DatasetKind::ALL.iter().all(|kind| options.includes(*kind)));
    }
}
