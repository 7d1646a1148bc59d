//! ACS table B25024, housing units by units in structure.

use agg_ingest::{DatasetSources, RawTable};
use agg_model::{Record, StockRecord};
use tracing::debug;

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::Result;
use crate::normalization::{clean_text, parse_count};
use crate::outcome::{DropReason, Normalized};
use crate::resolver::ColumnResolver;

/// Renames ACS estimate codes and turns the estimates into integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StockNormalizer;

/// Margin of error columns carry an `M` suffix (`B25024_001M`).
fn is_margin_of_error(header: &str) -> bool {
    header.trim().ends_with('M')
}

/// The ACS download repeats the headers as labels in its first data row.
fn has_label_row(table: &RawTable, resolver: &ColumnResolver) -> bool {
    table.rows.first().is_some_and(|row| {
        let total = resolver.value(row, "total_units");
        !total.trim().is_empty() && parse_count(total).is_none()
    })
}

impl DatasetNormalizer for StockNormalizer {
    type Output = StockRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<StockRecord>> {
        let mut out = Normalized::default();
        let count_columns = &StockRecord::COLUMNS[3..];

        for source in &sources.tables {
            let mut table = source.table.clone();
            out.absorb_malformed(&table);
            let before = table.width();
            table.drop_columns_where(is_margin_of_error);
            debug!(
                file = %source.path.display(),
                dropped = before - table.width(),
                "dropped margin of error columns"
            );

            let resolver = ColumnResolver::new(ctx.schema, &table);
            resolver.require("geo_id")?;
            resolver.require("total_units")?;
            let label_row = has_label_row(&table, &resolver);
            if label_row {
                out.drop_row(
                    &source.path,
                    table.rows[0].line,
                    DropReason::filtered("label row"),
                );
            }

            for row in table.rows.iter().skip(usize::from(label_row)) {
                let geo_id = clean_text(resolver.value(row, "geo_id"));
                if geo_id.is_empty() {
                    out.drop_row(&source.path, row.line, DropReason::missing("geo_id"));
                    continue;
                }
                let raw_total = resolver.value(row, "total_units").trim();
                let Some(total_units) = parse_count(raw_total) else {
                    let reason = if raw_total.is_empty() {
                        DropReason::missing("total_units")
                    } else {
                        DropReason::invalid("total_units", raw_total)
                    };
                    out.drop_row(&source.path, row.line, reason);
                    continue;
                };

                let mut counts = [None; 10];
                let mut invalid = None;
                for (slot, column) in counts.iter_mut().zip(count_columns) {
                    let raw = resolver.value(row, column).trim();
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

                let [
                    single_family_detached,
                    single_family_attached,
                    units_2,
                    units_3_4,
                    units_5_9,
                    units_10_19,
                    units_20_49,
                    units_50_plus,
                    mobile_homes,
                    boat_rv_van,
                ] = counts;
                out.push(StockRecord {
                    geo_id,
                    state_name: clean_text(resolver.value(row, "state_name")),
                    total_units,
                    single_family_detached,
                    single_family_attached,
                    units_2,
                    units_3_4,
                    units_5_9,
                    units_10_19,
                    units_20_49,
                    units_50_plus,
                    mobile_homes,
                    boat_rv_van,
                });
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_ingest::{RawRow, SourceTable};
    use agg_model::DatasetKind;
    use std::path::PathBuf;

    fn acs_sources() -> DatasetSources {
        let mut headers = vec!["GEO_ID".to_string(), "NAME".to_string()];
        for n in 1..=11 {
            headers.push(format!("B25024_{n:03}E"));
            headers.push(format!("B25024_{n:03}M"));
        }
        let row = |line: u64, geo: &str, name: &str, base: &str| {
            let mut cells = vec![geo.to_string(), name.to_string()];
            for n in 1..=11 {
                cells.push(format!("{base}{n}"));
                cells.push("+/-99".to_string());
            }
            RawRow { line, cells }
        };
        let mut label = row(2, "Geography", "Geographic Area Name", "Estimate!!Total:!!");
        label.cells[2] = "Estimate!!Total:".to_string();
        let path = PathBuf::from("ACSDT1Y2023.B25024-Data.csv");
        DatasetSources {
            kind: DatasetKind::Stock,
            tables: vec![SourceTable {
                path: path.clone(),
                year: Some(2023),
                table: RawTable {
                    source: path,
                    headers,
                    rows: vec![
                        label,
                        row(3, "0400000US01", "Alabama", "1,00"),
                        row(4, "", "Nowhere", "1"),
                    ],
                    malformed: Vec::new(),
                },
            }],
            addresses: None,
        }
    }

    #[test]
    fn renames_codes_and_skips_label_row() {
        let schema = agg_standards::load_default_registry()
            .unwrap()
            .get(DatasetKind::Stock)
            .unwrap()
            .clone();
        let out = StockNormalizer
            .normalize(&acs_sources(), &NormalizeContext::new(&schema))
            .unwrap();

        assert_eq!(out.records.len(), 1);
        let alabama = &out.records[0];
        assert_eq!(alabama.geo_id, "0400000US01");
        assert_eq!(alabama.state_name, "Alabama");
        assert_eq!(alabama.total_units, 1001);
        assert_eq!(alabama.units_2, Some(1004));
        assert_eq!(alabama.boat_rv_van, Some(10011));
        assert_eq!(out.dropped[0].reason, DropReason::filtered("label row"));
        assert_eq!(out.dropped[1].reason, DropReason::missing("geo_id"));
    }

    #[test]
    fn margin_columns() {
        assert!(is_margin_of_error("B25024_001M"));
        assert!(!is_margin_of_error("B25024_001E"));
        assert!(!is_margin_of_error("NAME"));
    }
}
