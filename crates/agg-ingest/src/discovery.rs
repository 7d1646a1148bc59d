//! File discovery and dataset matching.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use agg_model::DatasetKind;
use tracing::debug;

use crate::error::{IngestError, Result};

/// What a discovered file contributes to its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// The main table (or one year of a multi-file dataset).
    Primary,
    /// MSHA address table joined onto the mines table.
    MineAddress,
}

/// A CSV file classified by dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub kind: DatasetKind,
    pub role: SourceRole,
}

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

fn classify(stem: &str) -> Option<(DatasetKind, SourceRole)> {
    let upper = stem.to_uppercase().replace(['-', ' '], "_");
    if ["README", "METADATA", "_CLEANED", "DATA_DICTIONARY"]
        .iter()
        .any(|token| upper.contains(token))
    {
        return None;
    }
    if upper.contains("MINE") {
        let role = if upper.contains("ADDRESS") {
            SourceRole::MineAddress
        } else {
            SourceRole::Primary
        };
        return Some((DatasetKind::Mine, role));
    }
    let kind = if ["GHGP", "CLINKER", "CEMENT_PRODUCTION"]
        .iter()
        .any(|token| upper.contains(token))
    {
        DatasetKind::Clinker
    } else if upper.contains("CONSUMPTION") || upper.contains("DS140") {
        DatasetKind::Consumption
    } else if upper.contains("AGGREGATES") || upper.contains("PRODUCTION") {
        DatasetKind::Production
    } else if upper.contains("PERMIT") || upper.contains("STATEANNUAL") {
        DatasetKind::Permit
    } else if ["B25024", "BUILDINGTYPE", "BUILDING_TYPE", "STOCK"]
        .iter()
        .any(|token| upper.contains(token))
    {
        DatasetKind::Stock
    } else {
        return None;
    };
    Some((kind, SourceRole::Primary))
}

/// Classifies CSV files by dataset from their file names.
///
/// Files that match no dataset, documentation tables and previously cleaned
/// outputs are skipped.
pub fn discover_dataset_files(csv_files: &[PathBuf]) -> BTreeMap<DatasetKind, Vec<DiscoveredFile>> {
    let mut discovered: BTreeMap<DatasetKind, Vec<DiscoveredFile>> = BTreeMap::new();
    for path in csv_files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match classify(stem) {
            Some((kind, role)) => {
                discovered.entry(kind).or_default().push(DiscoveredFile {
                    path: path.clone(),
                    kind,
                    role,
                });
            }
            None => {
                debug!(file = %path.display(), "skipping unrecognised file");
            }
        }
    }
    discovered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(names: &[&str]) -> BTreeMap<DatasetKind, Vec<DiscoveredFile>> {
        let files: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        discover_dataset_files(&files)
    }

    #[test]
    fn classifies_source_file_names() {
        let found = kinds(&[
            "US-DOL-All-Sand-Mines_12072025.csv",
            "US-DOL-All-Sand-Mines-Address_12072025.csv",
            "ghgp_data_2014.csv",
            "ds140-construction_sand_and_gravel_consumption_1902_2022.csv",
            "USGS_Aggregates_Data_1971_2023.csv",
            "stateannual_202299.csv",
            "ACSDT1Y2023.B25024-Data.csv",
            "notes.csv",
        ]);
        assert_eq!(found[&DatasetKind::Mine].len(), 2);
        assert_eq!(found[&DatasetKind::Mine][1].role, SourceRole::MineAddress);
        assert_eq!(found[&DatasetKind::Clinker].len(), 1);
        assert_eq!(found[&DatasetKind::Consumption].len(), 1);
        assert_eq!(found[&DatasetKind::Production].len(), 1);
        assert_eq!(found[&DatasetKind::Permit].len(), 1);
        assert_eq!(found[&DatasetKind::Stock].len(), 1);
        assert_eq!(found.values().map(Vec::len).sum::<usize>(), 7);
    }

    #[test]
    fn cement_production_is_clinker_not_production() {
        let found = kinds(&["cement_production_2015-02_11_2026.csv"]);
        assert!(found.contains_key(&DatasetKind::Clinker));
        assert!(!found.contains_key(&DatasetKind::Production));
    }

    #[test]
    fn skips_cleaned_and_metadata_files() {
        let found = kinds(&[
            "stateannual_202299_cleaned.csv",
            "ACSDT1Y2023.B25024-Column-Metadata.csv",
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn list_csv_files_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.CSV"), "x\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "x\n").unwrap();
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();
        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.CSV"]);
    }

    #[test]
    fn missing_directory() {
        let err = list_csv_files(Path::new("/nonexistent/aggstock-data")).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
