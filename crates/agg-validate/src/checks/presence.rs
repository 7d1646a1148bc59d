//! Required column presence and population.

use std::collections::BTreeSet;

use agg_common::is_missing_value;

use super::{CheckContext, Finding};
use crate::issue::Issue;
use crate::util::cell;

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let height = ctx.df.height();

    for column in ctx.schema.required_columns() {
        let Some(name) = ctx.columns.get(&column.name) else {
            findings.push(Finding::rows(
                Issue::RequiredMissing {
                    variable: column.name.clone(),
                },
                (0..height).collect(),
            ));
            continue;
        };

        let empty: BTreeSet<usize> = (0..height)
            .filter(|&idx| is_missing_value(&cell(ctx.df, name, idx)))
            .collect();
        if !empty.is_empty() {
            findings.push(Finding::rows(
                Issue::RequiredEmpty {
                    variable: column.name.clone(),
                    null_count: empty.len() as u64,
                },
                empty,
            ));
        }
    }
    findings
}
