//! Apparent consumption balance.
//!
//! Reported apparent consumption should equal production plus imports minus
//! exports. Rows are compared against a relative tolerance with an absolute
//! floor and mismatches are reported without rejecting rows.

use agg_common::{any_to_f64, any_to_string, format_numeric};
use agg_model::DatasetKind;

use super::{CheckContext, Finding, Samples};
use crate::issue::Issue;
use crate::util::cell;

const APPARENT: &str = "Apparent consumption";

/// True when `reported` and `derived` agree within the tolerance.
pub(crate) fn balanced(reported: f64, derived: f64, tolerance: f64, floor: f64) -> bool {
    let allowed = (tolerance * reported.abs()).max(floor);
    (reported - derived).abs() <= allowed
}

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    if ctx.schema.kind != DatasetKind::Consumption {
        return Vec::new();
    }
    let lookup = |name: &str| ctx.columns.get(name);
    let (Some(apparent), Some(production)) = (lookup(APPARENT), lookup("Production")) else {
        return Vec::new();
    };
    let imports = lookup("Imports");
    let exports = lookup("Exports");
    let year = lookup("Year");
    let amount = |column: Option<&str>, idx: usize| {
        column
            .and_then(|name| any_to_f64(cell(ctx.df, name, idx)))
            .unwrap_or(0.0)
    };

    let mut count = 0u64;
    let mut samples = Samples::new(ctx.options.max_samples);
    for idx in 0..ctx.df.height() {
        let (Some(reported), Some(produced)) = (
            any_to_f64(cell(ctx.df, apparent, idx)),
            any_to_f64(cell(ctx.df, production, idx)),
        ) else {
            continue;
        };
        let derived = produced + amount(imports, idx) - amount(exports, idx);
        if balanced(
            reported,
            derived,
            ctx.options.balance_tolerance,
            ctx.options.balance_floor,
        ) {
            continue;
        }
        count += 1;
        let label = year
            .map(|name| any_to_string(cell(ctx.df, name, idx)))
            .unwrap_or_else(|| format!("row {idx}"));
        samples.push(format!(
            "{label}: reported {}, derived {}",
            format_numeric(reported),
            format_numeric(derived)
        ));
    }

    if count == 0 {
        return Vec::new();
    }
    vec![Finding::table(Issue::BalanceMismatch {
        variable: APPARENT.to_string(),
        mismatch_count: count,
        tolerance: ctx.options.balance_tolerance,
        samples: samples.into_vec(),
    })]
}
