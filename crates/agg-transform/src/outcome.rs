//! Normalization results and the rows left behind.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use agg_ingest::RawTable;
use agg_model::{DatasetKind, Record};
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::error::Result;

/// Why a raw row did not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    /// The row could not be aligned with the header.
    Malformed { reason: String },
    /// A required cell was empty.
    MissingRequired { column: String },
    /// A cell could not be coerced to its column type.
    Invalid { column: String, value: String },
    /// A dataset rule excludes the row.
    Filtered { rule: String },
}

impl DropReason {
    pub fn missing(column: &str) -> Self {
        DropReason::MissingRequired {
            column: column.to_string(),
        }
    }

    pub fn invalid(column: &str, value: &str) -> Self {
        DropReason::Invalid {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn filtered(rule: impl Into<String>) -> Self {
        DropReason::Filtered { rule: rule.into() }
    }

    /// Short category used for counting drops.
    pub fn category(&self) -> &'static str {
        match self {
            DropReason::Malformed { .. } => "malformed",
            DropReason::MissingRequired { .. } => "missing_required",
            DropReason::Invalid { .. } => "invalid",
            DropReason::Filtered { .. } => "filtered",
        }
    }

    /// True for drops caused by bad data rather than an intended filter.
    pub fn is_reject(&self) -> bool {
        !matches!(self, DropReason::Filtered { .. })
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Malformed { reason } => write!(f, "malformed row: {reason}"),
            DropReason::MissingRequired { column } => write!(f, "missing required {column}"),
            DropReason::Invalid { column, value } => write!(f, "invalid {column} '{value}'"),
            DropReason::Filtered { rule } => write!(f, "filtered: {rule}"),
        }
    }
}

/// A raw row that was dropped, located by source file and physical line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDrop {
    pub source: PathBuf,
    pub line: u64,
    pub reason: DropReason,
}

impl RowDrop {
    pub fn new(source: &Path, line: u64, reason: DropReason) -> Self {
        Self {
            source: source.to_path_buf(),
            line,
            reason,
        }
    }
}

/// Clean records of one dataset plus every row that was dropped.
#[derive(Debug, Clone)]
pub struct Normalized<R> {
    pub records: Vec<R>,
    pub dropped: Vec<RowDrop>,
}

impl<R> Default for Normalized<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

impl<R> Normalized<R> {
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn drop_row(&mut self, source: &Path, line: u64, reason: DropReason) {
        self.dropped.push(RowDrop::new(source, line, reason));
    }

    /// Records the rows the reader set aside for `table`.
    pub fn absorb_malformed(&mut self, table: &RawTable) {
        for row in &table.malformed {
            self.drop_row(
                &table.source,
                row.line,
                DropReason::Malformed {
                    reason: row.reason.clone(),
                },
            );
        }
    }

    /// Drop counts keyed by [`DropReason::category`].
    pub fn drop_counts(&self) -> BTreeMap<&'static str, usize> {
        drop_counts(&self.dropped)
    }
}

impl<R: Record> Normalized<R> {
    pub fn to_frame(&self) -> Result<DataFrame> {
        Ok(R::to_frame(&self.records)?)
    }

    /// Erases the record type, keeping the frame and the drops.
    pub fn into_table(self) -> Result<NormalizedTable> {
        let frame = R::to_frame(&self.records)?;
        Ok(NormalizedTable {
            kind: R::DATASET,
            records: self.records.len(),
            frame,
            dropped: self.dropped,
        })
    }
}

/// A normalized dataset as a clean frame, independent of its record type.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub kind: DatasetKind,
    pub records: usize,
    pub frame: DataFrame,
    pub dropped: Vec<RowDrop>,
}

impl NormalizedTable {
    pub fn drop_counts(&self) -> BTreeMap<&'static str, usize> {
        drop_counts(&self.dropped)
    }

    pub fn rejected(&self) -> usize {
        self.dropped.iter().filter(|d| d.reason.is_reject()).count()
    }
}

fn drop_counts(dropped: &[RowDrop]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for drop in dropped {
        *counts.entry(drop.reason.category()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_ingest::MalformedRow;
    use agg_model::ConsumptionRecord;

    #[test]
    fn counts_drops_by_category() {
        let mut normalized: Normalized<ConsumptionRecord> = Normalized::default();
        let source = Path::new("ds140.csv");
        normalized.drop_row(source, 4, DropReason::missing("Year"));
        normalized.drop_row(source, 5, DropReason::missing("Year"));
        normalized.drop_row(source, 9, DropReason::filtered("footnote"));
        let table = RawTable {
            source: source.to_path_buf(),
            malformed: vec![MalformedRow {
                line: 7,
                reason: "9 populated cells, header has 5".into(),
            }],
            ..RawTable::default()
        };
        normalized.absorb_malformed(&table);

        let counts = normalized.drop_counts();
        assert_eq!(counts["missing_required"], 2);
        assert_eq!(counts["filtered"], 1);
        assert_eq!(counts["malformed"], 1);

        let table = normalized.into_table().unwrap();
        assert_eq!(table.kind, DatasetKind::Consumption);
        assert_eq!(table.records, 0);
        assert_eq!(table.rejected(), 3);
        assert_eq!(table.frame.width(), ConsumptionRecord::COLUMNS.len());
    }

    #[test]
    fn reasons_render_for_logs() {
        assert_eq!(
            DropReason::invalid("Quantity", "abc").to_string(),
            "invalid Quantity 'abc'"
        );
        assert!(!DropReason::filtered("abandoned mine").is_reject());
    }
}
