#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agg_model::{DatasetKind, DatasetSchema};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, StandardsError};
use crate::loaders::{load_datasets, load_states, load_variables};

pub const DATASETS_FILE: &str = "Datasets.csv";
pub const VARIABLES_FILE: &str = "Variables.csv";
pub const STATES_FILE: &str = "States.csv";

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A standards file and its content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardsFile {
    pub name: String,
    pub sha256: String,
}

/// Canonical schemas for every dataset family plus the state lookup table.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    pub root: PathBuf,
    schemas: BTreeMap<DatasetKind, DatasetSchema>,
    states: BTreeMap<String, String>,
    files: Vec<StandardsFile>,
}

/// Serializable overview of a loaded registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySummary {
    pub schema: String,
    pub schema_version: u32,
    pub fingerprint: String,
    pub files: Vec<StandardsFile>,
    pub datasets: Vec<DatasetSummary>,
    pub states: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub dataset: DatasetKind,
    pub columns: usize,
    pub required: usize,
    pub keys: Vec<String>,
    pub documented: bool,
}

impl SchemaRegistry {
    /// Loads and cross-checks the three standards files under `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let datasets_path = root.join(DATASETS_FILE);
        let variables_path = root.join(VARIABLES_FILE);
        let states_path = root.join(STATES_FILE);

        let mut variables = load_variables(&variables_path)?;
        let mut schemas = BTreeMap::new();
        for mut schema in load_datasets(&datasets_path)? {
            let columns = variables.remove(&schema.kind).unwrap_or_default();
            if columns.is_empty() {
                return Err(StandardsError::EmptySchema {
                    dataset: schema.kind.to_string(),
                });
            }
            schema.columns = columns;
            schemas.insert(schema.kind, schema);
        }
        if let Some(orphan) = variables.keys().next() {
            return Err(StandardsError::MissingDataset {
                dataset: orphan.to_string(),
            });
        }
        for kind in DatasetKind::ALL {
            if !schemas.contains_key(&kind) {
                return Err(StandardsError::MissingDataset {
                    dataset: kind.to_string(),
                });
            }
        }
        let states = load_states(&states_path)?;

        let mut files = Vec::new();
        for (name, path) in [
            (DATASETS_FILE, &datasets_path),
            (VARIABLES_FILE, &variables_path),
            (STATES_FILE, &states_path),
        ] {
            let bytes = std::fs::read(path).map_err(|e| StandardsError::io(path, e))?;
            files.push(StandardsFile {
                name: name.to_string(),
                sha256: sha256_hex(&bytes),
            });
        }

        debug!(
            root = %root.display(),
            datasets = schemas.len(),
            states = states.len(),
            "loaded schema registry"
        );
        Ok(Self {
            root: root.to_path_buf(),
            schemas,
            states,
            files,
        })
    }

    pub fn get(&self, kind: DatasetKind) -> Result<&DatasetSchema> {
        self.schemas
            .get(&kind)
            .ok_or_else(|| StandardsError::MissingDataset {
                dataset: kind.to_string(),
            })
    }

    /// Schemas in dataset order.
    pub fn schemas(&self) -> impl Iterator<Item = &DatasetSchema> {
        self.schemas.values()
    }

    /// Dataset kinds the registry declares.
    pub fn datasets(&self) -> Vec<DatasetKind> {
        self.schemas.keys().copied().collect()
    }

    /// Full state name for a USPS abbreviation (`"TX"` -> `"Texas"`).
    pub fn state_name(&self, abbrev: &str) -> Option<&str> {
        self.states
            .get(&abbrev.trim().to_uppercase())
            .map(String::as_str)
    }

    /// USPS abbreviation for a full state name, case-insensitive.
    pub fn state_abbrev(&self, name: &str) -> Option<&str> {
        let needle = name.trim();
        self.states
            .iter()
            .find(|(_, full)| full.eq_ignore_ascii_case(needle))
            .map(|(abbrev, _)| abbrev.as_str())
    }

    pub fn files(&self) -> &[StandardsFile] {
        &self.files
    }

    /// Digest over all standards files; changes whenever any of them does.
    pub fn fingerprint(&self) -> String {
        let joined: String = self
            .files
            .iter()
            .map(|file| format!("{}:{}\n", file.name, file.sha256))
            .collect();
        sha256_hex(joined.as_bytes())
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            schema: "aggstock.schema-registry".to_string(),
            schema_version: 1,
            fingerprint: self.fingerprint(),
            files: self.files.clone(),
            datasets: self
                .schemas()
                .map(|schema| DatasetSummary {
                    dataset: schema.kind,
                    columns: schema.columns.len(),
                    required: schema.required_columns().len(),
                    keys: schema
                        .key_columns()
                        .iter()
                        .map(|c| c.name.clone())
                        .collect(),
                    documented: schema.documented,
                })
                .collect(),
            states: self.states.len(),
        }
    }
}
