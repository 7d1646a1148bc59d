//! USGS aggregates time series, aggregated to state totals.

use std::collections::BTreeMap;

use agg_ingest::{DatasetSources, RawRow};
use agg_model::ProductionRecord;
use tracing::{debug, warn};

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::Result;
use crate::normalization::{clean_text, is_suppressed, parse_numeric, parse_year};
use crate::outcome::{DropReason, Normalized};
use crate::resolver::ColumnResolver;

const DESCRIPTION_COLUMN: &str = "Data Description";
const COMMODITY_COLUMN: &str = "Commodity";
const STATE_TOTALS: &str = "State totals";
/// Total class that later years add on top of the individual commodities.
const COMBINED_COMMODITY: &str = "Aggregates, construction";

/// Filters state totals and sums quantity and value per year, state and region.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionNormalizer;

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    quantity: f64,
    total_value: f64,
}

type GroupKey = (i32, String, String);

/// Optional filter columns of the raw time series.
#[derive(Debug, Clone, Copy)]
struct FilterColumns {
    description: Option<usize>,
    commodity: Option<usize>,
}

struct Contribution {
    key: GroupKey,
    quantity: f64,
    total_value: Option<f64>,
}

fn required_or_invalid(column: &str, raw: &str) -> DropReason {
    if raw.is_empty() {
        DropReason::missing(column)
    } else {
        DropReason::invalid(column, raw)
    }
}

fn contribution(
    resolver: &ColumnResolver,
    filters: FilterColumns,
    row: &RawRow,
) -> std::result::Result<Contribution, DropReason> {
    if let Some(idx) = filters.description
        && !row.cells[idx].trim().eq_ignore_ascii_case(STATE_TOTALS)
    {
        return Err(DropReason::filtered("not a state total"));
    }
    if let Some(idx) = filters.commodity
        && row.cells[idx].trim().eq_ignore_ascii_case(COMBINED_COMMODITY)
    {
        return Err(DropReason::filtered("combined commodity class"));
    }
    let raw_quantity = resolver.value(row, "Quantity").trim();
    if is_suppressed(raw_quantity) {
        return Err(DropReason::filtered("suppressed quantity"));
    }
    let region = clean_text(resolver.value(row, "Region"));
    if region.is_empty() {
        return Err(DropReason::filtered("national total without region"));
    }

    let raw_year = resolver.value(row, "Year").trim();
    let year = parse_year(raw_year).ok_or_else(|| required_or_invalid("Year", raw_year))?;
    let state = clean_text(resolver.value(row, "State Coverage"));
    if state.is_empty() {
        return Err(DropReason::missing("State Coverage"));
    }
    let quantity =
        parse_numeric(raw_quantity).ok_or_else(|| required_or_invalid("Quantity", raw_quantity))?;
    let raw_value = resolver.value(row, "Total Value").trim();
    let total_value = match parse_numeric(raw_value) {
        Some(value) => Some(value),
        None if raw_value.is_empty() || is_suppressed(raw_value) => None,
        None => return Err(DropReason::invalid("Total Value", raw_value)),
    };
    Ok(Contribution {
        key: (year, state, region),
        quantity,
        total_value,
    })
}

impl DatasetNormalizer for ProductionNormalizer {
    type Output = ProductionRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<ProductionRecord>> {
        let mut out = Normalized::default();
        let mut groups: BTreeMap<GroupKey, Totals> = BTreeMap::new();
        let mut unvalued = 0usize;

        for source in &sources.tables {
            let table = &source.table;
            out.absorb_malformed(table);
            let resolver = ColumnResolver::new(ctx.schema, table);
            for column in ["Year", "State Coverage", "Region", "Quantity"] {
                resolver.require(column)?;
            }
            let filters = FilterColumns {
                description: table.column_index(DESCRIPTION_COLUMN),
                commodity: table.column_index(COMMODITY_COLUMN),
            };

            for row in &table.rows {
                match contribution(&resolver, filters, row) {
                    Ok(found) => {
                        let totals = groups.entry(found.key).or_default();
                        totals.quantity += found.quantity;
                        match found.total_value {
                            Some(value) => totals.total_value += value,
                            None => unvalued += 1,
                        }
                    }
                    Err(reason) => out.drop_row(&source.path, row.line, reason),
                }
            }
        }

        if unvalued > 0 {
            warn!(rows = unvalued, "rows without a total value were summed as zero");
        }
        debug!(groups = groups.len(), "aggregated production");
        out.records = groups
            .into_iter()
            .map(|((year, state, region), totals)| ProductionRecord {
                year,
                state,
                region,
                quantity: totals.quantity,
                total_value: totals.total_value,
            })
            .collect();
        Ok(out)
    }
}
