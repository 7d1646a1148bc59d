//! Coordinate, year and declared value bounds.
//!
//! Values that do not parse are left to the datatype check; only parsed
//! values outside their bounds reject rows.

use std::collections::BTreeSet;

use agg_common::{any_to_f64, any_to_i64, format_numeric};
use agg_model::{ColumnDef, ColumnType};

use super::{CheckContext, Finding, Samples};
use crate::issue::Issue;
use crate::util::cell;

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|lo| value >= lo) && max.is_none_or(|hi| value <= hi)
}

/// Rows whose parsed value falls outside `[min, max]`.
fn out_of_bounds(
    ctx: &CheckContext<'_>,
    name: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> (BTreeSet<usize>, Vec<String>) {
    let mut rows = BTreeSet::new();
    let mut samples = Samples::new(ctx.options.max_samples);
    for idx in 0..ctx.df.height() {
        if let Some(value) = any_to_f64(cell(ctx.df, name, idx))
            && !within(value, min, max)
        {
            rows.insert(idx);
            samples.push(format_numeric(value));
        }
    }
    (rows, samples.into_vec())
}

fn check_coordinate(ctx: &CheckContext<'_>, column: &ColumnDef, name: &str) -> Option<Finding> {
    let (min, max) = column.bounds();
    let (Some(min), Some(max)) = (min, max) else {
        return None;
    };
    let (rows, samples) = out_of_bounds(ctx, name, Some(min), Some(max));
    (!rows.is_empty()).then(|| {
        Finding::rows(
            Issue::CoordinateOutOfRange {
                variable: column.name.clone(),
                out_of_range_count: rows.len() as u64,
                min,
                max,
                samples,
            },
            rows,
        )
    })
}

fn check_year(ctx: &CheckContext<'_>, column: &ColumnDef, name: &str) -> Option<Finding> {
    let range = ctx.schema.years?;
    let mut rows = BTreeSet::new();
    let mut samples = Samples::new(ctx.options.max_samples);
    for idx in 0..ctx.df.height() {
        if let Some(year) = any_to_i64(cell(ctx.df, name, idx))
            && !i32::try_from(year).is_ok_and(|y| range.contains(y))
        {
            rows.insert(idx);
            samples.push(year.to_string());
        }
    }
    (!rows.is_empty()).then(|| {
        Finding::rows(
            Issue::YearOutOfRange {
                variable: column.name.clone(),
                out_of_range_count: rows.len() as u64,
                min: range.min,
                max: range.max,
                samples: samples.into_vec(),
            },
            rows,
        )
    })
}

fn check_value(ctx: &CheckContext<'_>, column: &ColumnDef, name: &str) -> Option<Finding> {
    let (min, max) = column.bounds();
    if min.is_none() && max.is_none() {
        return None;
    }
    let (rows, samples) = out_of_bounds(ctx, name, min, max);
    (!rows.is_empty()).then(|| {
        Finding::rows(
            Issue::ValueOutOfRange {
                variable: column.name.clone(),
                out_of_range_count: rows.len() as u64,
                min,
                max,
                samples,
            },
            rows,
        )
    })
}

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    ctx.schema
        .columns
        .iter()
        .filter_map(|column| {
            let name = ctx.columns.get(&column.name)?;
            match column.column_type {
                ColumnType::Char => None,
                ColumnType::Latitude | ColumnType::Longitude => {
                    check_coordinate(ctx, column, name)
                }
                ColumnType::Year => check_year(ctx, column, name),
                ColumnType::Num | ColumnType::Int => check_value(ctx, column, name),
            }
        })
        .collect()
}
