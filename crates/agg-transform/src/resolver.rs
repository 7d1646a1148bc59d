//! Maps canonical schema columns onto raw table headers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use agg_ingest::{RawRow, RawTable};
use agg_model::DatasetSchema;
use tracing::debug;

use crate::error::{Result, TransformError};

/// Header with the `_x` suffix a join leaves on colliding columns removed.
fn join_base(header: &str) -> Option<&str> {
    let header = header.trim();
    header
        .strip_suffix("_x")
        .or_else(|| header.strip_suffix("_X"))
}

/// Resolved positions of canonical columns within one raw table.
///
/// A header matches a column by its canonical name, then by any alias from
/// the registry, then by either of those with the `_x` suffix a join leaves
/// on colliding columns. Matching ignores case and repeated whitespace.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    source: PathBuf,
    indices: BTreeMap<String, usize>,
    missing: Vec<String>,
}

impl ColumnResolver {
    pub fn new(schema: &DatasetSchema, table: &RawTable) -> Self {
        let mut indices = BTreeMap::new();
        let mut missing = Vec::new();
        for column in &schema.columns {
            let found = table
                .headers
                .iter()
                .position(|h| column.matches_header(h))
                .or_else(|| {
                    table.headers.iter().position(|h| {
                        join_base(h).is_some_and(|base| column.matches_header(base))
                    })
                });
            match found {
                Some(idx) => {
                    indices.insert(column.name.clone(), idx);
                }
                None => missing.push(column.name.clone()),
            }
        }
        debug!(
            dataset = %schema.kind,
            source = %table.source.display(),
            resolved = indices.len(),
            missing = ?missing,
            "resolved columns"
        );
        Self {
            source: table.source.clone(),
            indices,
            missing,
        }
    }

    /// Position of canonical column `name`, if the table has it.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Like [`index`](Self::index) but fails with `MissingColumn`.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index(name).ok_or_else(|| TransformError::MissingColumn {
            column: name.to_string(),
            path: self.source.clone(),
        })
    }

    /// Cell of canonical column `name` in `row`, empty when unresolved.
    pub fn value<'r>(&self, row: &'r RawRow, name: &str) -> &'r str {
        self.index(name)
            .and_then(|idx| row.cells.get(idx))
            .map_or("", String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Canonical columns with no matching header.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}
