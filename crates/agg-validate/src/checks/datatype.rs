//! Numeric type checks.

use agg_common::{any_to_f64, any_to_i64, any_to_string, is_missing_value};
use agg_model::ColumnType;

use super::{CheckContext, Finding, Samples};
use crate::issue::Issue;
use crate::util::cell;

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    for column in ctx.schema.columns.iter().filter(|c| c.column_type.is_numeric()) {
        let Some(name) = ctx.columns.get(&column.name) else {
            continue;
        };
        let whole = matches!(column.column_type, ColumnType::Int | ColumnType::Year);
        let mut count = 0u64;
        let mut samples = Samples::new(ctx.options.max_samples);

        for idx in 0..ctx.df.height() {
            let value = cell(ctx.df, name, idx);
            if is_missing_value(&value) {
                continue;
            }
            let parsed = if whole {
                any_to_i64(value.clone()).is_some()
            } else {
                any_to_f64(value.clone()).is_some()
            };
            if !parsed {
                count += 1;
                samples.push(any_to_string(value));
            }
        }

        if count > 0 {
            findings.push(Finding::table(Issue::DataTypeMismatch {
                variable: column.name.clone(),
                non_numeric_count: count,
                samples: samples.into_vec(),
            }));
        }
    }
    findings
}
