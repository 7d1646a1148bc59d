//! Per-dataset loading of the discovered source files.

use std::path::PathBuf;

use agg_model::{DatasetKind, ReadOptions};
use tracing::{info, warn};

use crate::csv_table::{RawTable, read_csv_table};
use crate::discovery::{DiscoveredFile, SourceRole};
use crate::error::Result;
use crate::year::extract_year;

/// Preamble lines above the data block in Census BPS state annual files.
pub const PERMIT_PREAMBLE_ROWS: usize = 6;

/// One raw table with the year implied by its file name.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub year: Option<i32>,
    pub table: RawTable,
}

/// Every raw table that feeds one dataset.
#[derive(Debug, Clone)]
pub struct DatasetSources {
    pub kind: DatasetKind,
    pub tables: Vec<SourceTable>,
    /// MSHA address table, only for mines.
    pub addresses: Option<SourceTable>,
}

impl DatasetSources {
    pub fn malformed_count(&self) -> usize {
        self.tables
            .iter()
            .chain(self.addresses.iter())
            .map(|source| source.table.malformed.len())
            .sum()
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|source| source.table.height()).sum()
    }
}

/// How each dataset's native layout is read.
pub fn read_options_for(kind: DatasetKind) -> ReadOptions {
    match kind {
        DatasetKind::Permit => ReadOptions::new()
            .headerless()
            .with_skip_rows(PERMIT_PREAMBLE_ROWS)
            .with_drop_empty_columns(true),
        DatasetKind::Consumption | DatasetKind::Stock => {
            ReadOptions::new().with_drop_empty_columns(true)
        }
        DatasetKind::Mine | DatasetKind::Production | DatasetKind::Clinker => ReadOptions::new(),
    }
}

fn load_one(file: &DiscoveredFile, options: &ReadOptions) -> Result<SourceTable> {
    let table = read_csv_table(&file.path, options)?;
    let year = extract_year(&file.path);
    if year.is_none() && file.kind.is_multi_file() {
        warn!(file = %file.path.display(), "could not extract year from file name");
    }
    Ok(SourceTable {
        path: file.path.clone(),
        year,
        table,
    })
}

/// Reads every discovered file of `kind` with that dataset's read options.
pub fn load_dataset_sources(kind: DatasetKind, files: &[DiscoveredFile]) -> Result<DatasetSources> {
    let options = read_options_for(kind);
    let mut sources = DatasetSources {
        kind,
        tables: Vec::new(),
        addresses: None,
    };
    for file in files.iter().filter(|f| f.kind == kind) {
        let loaded = load_one(file, &options)?;
        match file.role {
            SourceRole::Primary => sources.tables.push(loaded),
            SourceRole::MineAddress => {
                if sources.addresses.is_some() {
                    warn!(file = %file.path.display(), "ignoring extra address table");
                    continue;
                }
                sources.addresses = Some(loaded);
            }
        }
    }
    info!(
        dataset = %kind,
        files = sources.tables.len() + usize::from(sources.addresses.is_some()),
        rows = sources.row_count(),
        malformed = sources.malformed_count(),
        "loaded sources"
    );
    Ok(sources)
}
