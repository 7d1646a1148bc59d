//! Identifier uniqueness.
//!
//! The first occurrence of a key is kept; later repeats are rejected. Rows
//! with an empty key component are left to the presence check.

use std::collections::{BTreeSet, HashSet};

use agg_common::{any_to_string, is_missing_value};

use super::{CheckContext, Finding, Samples};
use crate::issue::Issue;
use crate::util::cell;

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let keys = ctx.schema.key_columns();
    if keys.is_empty() {
        return Vec::new();
    }
    let Some(names) = keys
        .iter()
        .map(|c| ctx.columns.get(&c.name))
        .collect::<Option<Vec<_>>>()
    else {
        return Vec::new();
    };

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut rows = BTreeSet::new();
    let mut samples = Samples::new(ctx.options.max_samples);
    'rows: for idx in 0..ctx.df.height() {
        let mut parts = Vec::with_capacity(names.len());
        for name in &names {
            let value = cell(ctx.df, name, idx);
            if is_missing_value(&value) {
                continue 'rows;
            }
            parts.push(any_to_string(value).trim().to_string());
        }
        let sample = parts.join("/");
        if !seen.insert(parts) {
            rows.insert(idx);
            samples.push(sample);
        }
    }

    if rows.is_empty() {
        return Vec::new();
    }
    let variable = keys
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("+");
    vec![Finding::rows(
        Issue::DuplicateKey {
            variable,
            duplicate_count: rows.len() as u64,
            samples: samples.into_vec(),
        },
        rows,
    )]
}
