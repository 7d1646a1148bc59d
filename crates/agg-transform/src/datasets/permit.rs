//! Census Building Permits Survey, state annual tables.
//!
//! The source files have no usable header: after the preamble each row is a
//! location followed by six counts, so columns are assigned by position.

use agg_ingest::{DatasetSources, SourceTable};
use agg_model::{PermitRecord, Record};
use tracing::warn;

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::Result;
use crate::normalization::{clean_text, parse_count};
use crate::outcome::{DropReason, Normalized};

/// Data columns after the preamble and empty columns are removed: the
/// location plus six counts. The year comes from the file name.
pub const PERMIT_DATA_COLUMNS: usize = 7;

/// Assigns positional columns and the file-name year to permit tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitNormalizer;

fn normalize_table(source: &SourceTable, out: &mut Normalized<PermitRecord>) {
    let table = &source.table;
    out.absorb_malformed(table);
    if table.width() != PERMIT_DATA_COLUMNS {
        warn!(
            file = %source.path.display(),
            columns = table.width(),
            expected = PERMIT_DATA_COLUMNS,
            "unexpected permit column count, assigning by position"
        );
    }
    let count_columns = &PermitRecord::COLUMNS[2..];

    for row in &table.rows {
        let Some(year) = source.year else {
            out.drop_row(&source.path, row.line, DropReason::missing("year"));
            continue;
        };
        let location = clean_text(row.cells.first().map_or("", String::as_str));
        if location.is_empty() {
            out.drop_row(&source.path, row.line, DropReason::missing("location"));
            continue;
        }

        let mut counts = [None; 6];
        let mut invalid = None;
        for (position, (slot, column)) in counts.iter_mut().zip(count_columns).enumerate() {
            let raw = row.cells.get(position + 1).map_or("", |c| c.trim());
            if raw.is_empty() {
                continue;
            }
            match parse_count(raw) {
                Some(value) => *slot = Some(value),
                None => {
                    invalid = Some(DropReason::invalid(column, raw));
                    break;
                }
            }
        }
        if let Some(reason) = invalid {
            out.drop_row(&source.path, row.line, reason);
            continue;
        }
        if counts.iter().all(Option::is_none) {
            out.drop_row(&source.path, row.line, DropReason::filtered("section heading"));
            continue;
        }

        let [total, one, two, three_four, five_more, structures] = counts;
        out.push(PermitRecord {
            year,
            location,
            total,
            num_1_units: one,
            num_2_units: two,
            num_3_4_units: three_four,
            num_5_more_units: five_more,
            num_structures_more_5_units: structures,
        });
    }
}

impl DatasetNormalizer for PermitNormalizer {
    type Output = PermitRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        _ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<PermitRecord>> {
        let mut out = Normalized::default();
        for source in &sources.tables {
            normalize_table(source, &mut out);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_ingest::{RawRow, RawTable};
    use agg_model::DatasetKind;
    use std::path::PathBuf;

    fn table(name: &str, year: Option<i32>, rows: &[&[&str]]) -> SourceTable {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        SourceTable {
            path: PathBuf::from(name),
            year,
            table: RawTable {
                source: PathBuf::from(name),
                headers: (1..=width).map(|n| format!("column_{n}")).collect(),
                rows: rows
                    .iter()
                    .enumerate()
                    .map(|(idx, cells)| RawRow {
                        line: idx as u64 + 8,
                        cells: cells.iter().map(|c| (*c).to_string()).collect(),
                    })
                    .collect(),
                malformed: Vec::new(),
            },
        }
    }

    #[test]
    fn assigns_positional_columns() {
        let schema = agg_standards::load_default_registry()
            .unwrap()
            .get(DatasetKind::Permit)
            .unwrap()
            .clone();
        let sources = DatasetSources {
            kind: DatasetKind::Permit,
            tables: vec![table(
                "stateannual_202299.csv",
                Some(2022),
                &[
                    &["United States and Regions", "", "", "", "", "", ""],
                    &["Alabama", "19,101", "16,209", "58", "71", "2,763", "151"],
                    &["Alaska", "1,012", "612", "", "", "", ""],
                    &["Arizona", "n/a", "", "", "", "", ""],
                ],
            )],
            addresses: None,
        };
        let out = PermitNormalizer
            .normalize(&sources, &NormalizeContext::new(&schema))
            .unwrap();

        assert_eq!(out.records.len(), 2);
        let alabama = &out.records[0];
        assert_eq!(alabama.year, 2022);
        assert_eq!(alabama.total, Some(19_101));
        assert_eq!(alabama.num_structures_more_5_units, Some(151));
        assert_eq!(out.records[1].num_2_units, None);
        assert_eq!(out.dropped[0].reason, DropReason::filtered("section heading"));
        assert_eq!(out.dropped[1].reason, DropReason::invalid("total", "n/a"));
    }

    #[test]
    fn rows_need_a_year() {
        let schema = agg_standards::load_default_registry()
            .unwrap()
            .get(DatasetKind::Permit)
            .unwrap()
            .clone();
        let sources = DatasetSources {
            kind: DatasetKind::Permit,
            tables: vec![table("permits.csv", None, &[&["Alabama", "1", "1", "", "", "", ""]])],
            addresses: None,
        };
        let out = PermitNormalizer
            .normalize(&sources, &NormalizeContext::new(&schema))
            .unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.dropped[0].reason, DropReason::missing("year"));
    }
}
