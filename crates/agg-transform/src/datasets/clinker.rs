//! EPA GHGRP cement producers.

use agg_ingest::{DatasetSources, SourceTable};
use agg_model::ClinkerRecord;
use tracing::{debug, warn};

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::Result;
use crate::normalization::{
    clean_identifier, clean_text, normalize_zip, parse_coordinate, parse_numeric, parse_year,
};
use crate::outcome::{DropReason, Normalized};
use crate::resolver::ColumnResolver;

/// Industry type codes of cement producers (subpart H).
pub const CEMENT_INDUSTRY_CODES: &[&str] = &["C,H", "H"];

const INDUSTRY_COLUMN: &str = "Industry Type (subparts)";
const YEAR_COLUMN: &str = "year";

/// Keeps cement producers and stacks the yearly files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClinkerNormalizer;

fn is_cement_producer(code: &str) -> bool {
    let code = code.trim();
    CEMENT_INDUSTRY_CODES.iter().any(|c| *c == code)
}

fn normalize_table(
    source: &SourceTable,
    ctx: &NormalizeContext<'_>,
    out: &mut Normalized<ClinkerRecord>,
) -> Result<()> {
    let table = &source.table;
    out.absorb_malformed(table);
    let resolver = ColumnResolver::new(ctx.schema, table);
    resolver.require("Facility Id")?;
    let industry = table.column_index(INDUSTRY_COLUMN);
    if industry.is_none() {
        debug!(
            file = %source.path.display(),
            "no industry type column, keeping all facilities"
        );
    }
    let year_column = resolver.has(YEAR_COLUMN);
    if !year_column && source.year.is_none() {
        warn!(file = %source.path.display(), "no year column and no year in file name");
    }

    for row in &table.rows {
        if let Some(idx) = industry
            && !is_cement_producer(&row.cells[idx])
        {
            out.drop_row(
                &source.path,
                row.line,
                DropReason::filtered("not a cement producer"),
            );
            continue;
        }
        let facility_id = clean_identifier(resolver.value(row, "Facility Id"));
        if facility_id.is_empty() {
            out.drop_row(&source.path, row.line, DropReason::missing("Facility Id"));
            continue;
        }
        let year = if year_column {
            let raw = resolver.value(row, YEAR_COLUMN);
            match parse_year(raw) {
                Some(year) => Some(year),
                None if raw.trim().is_empty() => source.year,
                None => {
                    out.drop_row(&source.path, row.line, DropReason::invalid(YEAR_COLUMN, raw));
                    continue;
                }
            }
        } else {
            source.year
        };
        let Some(year) = year else {
            out.drop_row(&source.path, row.line, DropReason::missing(YEAR_COLUMN));
            continue;
        };

        let mut coordinates = [0.0f64; 2];
        let mut rejected = None;
        for (slot, column) in coordinates.iter_mut().zip(["Latitude", "Longitude"]) {
            let raw = resolver.value(row, column);
            match parse_coordinate(raw) {
                Some(value) => *slot = value,
                None if raw.trim().is_empty() => {
                    rejected = Some(DropReason::missing(column));
                    break;
                }
                None => {
                    rejected = Some(DropReason::invalid(column, raw.trim()));
                    break;
                }
            }
        }
        if let Some(reason) = rejected {
            out.drop_row(&source.path, row.line, reason);
            continue;
        }

        out.push(ClinkerRecord {
            facility_id,
            facility_name: clean_text(resolver.value(row, "Facility Name")),
            city: clean_text(resolver.value(row, "City")),
            state: clean_text(resolver.value(row, "State")),
            zip_code: normalize_zip(resolver.value(row, "Zip Code")),
            address: clean_text(resolver.value(row, "Address")),
            county: clean_text(resolver.value(row, "County")),
            latitude: coordinates[0],
            longitude: coordinates[1],
            cement_production: parse_numeric(resolver.value(row, "Cement Production")),
            year,
        });
    }
    Ok(())
}

impl DatasetNormalizer for ClinkerNormalizer {
    type Output = ClinkerRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<ClinkerRecord>> {
        let mut out = Normalized::default();
        for source in &sources.tables {
            let before = out.records.len();
            normalize_table(source, ctx, &mut out)?;
            debug!(
                file = %source.path.display(),
                year = ?source.year,
                facilities = out.records.len() - before,
                "normalized clinker file"
            );
        }
        Ok(out)
    }
}
