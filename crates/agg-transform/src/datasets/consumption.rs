//! USGS DS-140 construction sand and gravel apparent consumption.

use agg_ingest::{DatasetSources, RawRow};
use agg_model::ConsumptionRecord;

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::Result;
use crate::normalization::{parse_numeric, parse_year};
use crate::outcome::{DropReason, Normalized};
use crate::resolver::ColumnResolver;

const AMOUNT_COLUMNS: [&str; 4] = ["Production", "Imports", "Exports", "Apparent consumption"];

/// Keeps the national balance columns; empty amounts count as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumptionNormalizer;

fn amounts(resolver: &ColumnResolver, row: &RawRow) -> std::result::Result<[f64; 4], DropReason> {
    let mut values = [0.0; 4];
    for (slot, column) in values.iter_mut().zip(AMOUNT_COLUMNS) {
        let raw = resolver.value(row, column).trim();
        if raw.is_empty() {
            continue;
        }
        *slot = parse_numeric(raw).ok_or_else(|| DropReason::invalid(column, raw))?;
    }
    Ok(values)
}

impl DatasetNormalizer for ConsumptionNormalizer {
    type Output = ConsumptionRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<ConsumptionRecord>> {
        let mut out = Normalized::default();
        for source in &sources.tables {
            let table = &source.table;
            out.absorb_malformed(table);
            let resolver = ColumnResolver::new(ctx.schema, table);
            resolver.require("Year")?;
            for column in AMOUNT_COLUMNS {
                resolver.require(column)?;
            }

            for row in &table.rows {
                let raw_year = resolver.value(row, "Year").trim();
                if raw_year.is_empty() {
                    out.drop_row(&source.path, row.line, DropReason::missing("Year"));
                    continue;
                }
                let Some(year) = parse_year(raw_year) else {
                    out.drop_row(&source.path, row.line, DropReason::invalid("Year", raw_year));
                    continue;
                };
                match amounts(&resolver, row) {
                    Ok([production, imports, exports, apparent_consumption]) => {
                        out.push(ConsumptionRecord {
                            year,
                            production,
                            imports,
                            exports,
                            apparent_consumption,
                        });
                    }
                    Err(reason) => out.drop_row(&source.path, row.line, reason),
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_ingest::{RawTable, SourceTable};
    use agg_model::DatasetKind;
    use std::path::PathBuf;

    fn sources(rows: &[&[&str]]) -> DatasetSources {
        let path = PathBuf::from("ds140-consumption.csv");
        DatasetSources {
            kind: DatasetKind::Consumption,
            tables: vec![SourceTable {
                path: path.clone(),
                year: None,
                table: RawTable {
                    source: path,
                    headers: [
                        "Year",
                        "Production",
                        "Imports",
                        "Exports",
                        "Apparent consumption",
                        "Unit value ($/t)",
                    ]
                    .iter()
                    .map(|h| (*h).to_string())
                    .collect(),
                    rows: rows
                        .iter()
                        .enumerate()
                        .map(|(idx, cells)| RawRow {
                            line: idx as u64 + 2,
                            cells: cells.iter().map(|c| (*c).to_string()).collect(),
                        })
                        .collect(),
                    malformed: Vec::new(),
                },
            }],
            addresses: None,
        }
    }

    #[test]
    fn fills_missing_amounts_and_strips_commas() {
        let schema = agg_standards::load_default_registry()
            .unwrap()
            .get(DatasetKind::Consumption)
            .unwrap()
            .clone();
        let input = sources(&[
            &["1902", "24,000,000", "", "", "24,000,000", "0.30"],
            &["2022", "960,000,000", "450,000", "180,000", "960,270,000", "10.4"],
            &["", "1", "2", "3", "4", ""],
            &["See notes", "", "", "", "", ""],
            &["2021", "W", "", "", "1", ""],
        ]);
        let out = ConsumptionNormalizer
            .normalize(&input, &NormalizeContext::new(&schema))
            .unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].imports, 0.0);
        assert_eq!(out.records[0].production, 24_000_000.0);
        assert_eq!(out.records[1].derived_consumption(), 960_270_000.0);
        let reasons: Vec<_> = out.dropped.iter().map(|d| d.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::missing("Year"),
                DropReason::invalid("Year", "See notes"),
                DropReason::invalid("Production", "W"),
            ]
        );
    }
}
