//! Column set comparison against the declared schema.

use std::collections::HashSet;

use agg_model::schema::header_key;

use super::{CheckContext, Finding};
use crate::issue::Issue;

pub(crate) fn check(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let missing: Vec<String> = ctx
        .schema
        .columns
        .iter()
        .filter(|c| !ctx.columns.contains(&c.name))
        .map(|c| c.name.clone())
        .collect();

    let declared: HashSet<String> = ctx
        .schema
        .columns
        .iter()
        .map(|c| header_key(&c.name))
        .collect();
    let unexpected: Vec<String> = ctx
        .df
        .get_column_names_owned()
        .into_iter()
        .filter(|name| !declared.contains(&header_key(name.as_str())))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Vec::new();
    }
    vec![Finding::table(Issue::SchemaMismatch {
        missing,
        unexpected,
        provisional: ctx.schema.is_provisional(),
    })]
}
