//! Dataset families handled by the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One family of source tables.
///
/// Each kind owns one schema in the registry, one normalizer and one clean
/// output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// MSHA sand and gravel mine locations.
    Mine,
    /// USGS aggregates production by state.
    Production,
    /// EPA GHGRP cement producers ("clinker").
    Clinker,
    /// USGS DS-140 apparent consumption.
    Consumption,
    /// Census Building Permits Survey, state annual files.
    Permit,
    /// ACS B25024 housing units by structure type.
    Stock,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 6] = [
        DatasetKind::Mine,
        DatasetKind::Production,
        DatasetKind::Clinker,
        DatasetKind::Consumption,
        DatasetKind::Permit,
        DatasetKind::Stock,
    ];

    /// Registry code, as it appears in `Datasets.csv`.
    pub fn code(&self) -> &'static str {
        match self {
            DatasetKind::Mine => "mine",
            DatasetKind::Production => "production",
            DatasetKind::Clinker => "clinker",
            DatasetKind::Consumption => "consumption",
            DatasetKind::Permit => "permit",
            DatasetKind::Stock => "stock",
        }
    }

    /// Kinds whose source layout spans several files that are stacked.
    pub fn is_multi_file(&self) -> bool {
        matches!(self, DatasetKind::Clinker | DatasetKind::Permit)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DatasetKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mine" | "mines" => Ok(DatasetKind::Mine),
            "production" => Ok(DatasetKind::Production),
            "clinker" | "cement" => Ok(DatasetKind::Clinker),
            "consumption" => Ok(DatasetKind::Consumption),
            "permit" | "permits" => Ok(DatasetKind::Permit),
            "stock" | "housing" => Ok(DatasetKind::Stock),
            _ => Err(ModelError::UnknownDataset(s.to_string())),
        }
    }
}
