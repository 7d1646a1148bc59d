//! Validation check modules.
//!
//! Each module performs one family of checks and returns [`Finding`]s: the
//! issue plus the row indices it rejects.

mod balance;
mod datatype;
mod keys;
mod presence;
mod range;
mod schema;

use std::collections::BTreeSet;

use agg_model::{DatasetSchema, ValidationOptions};
use polars::prelude::DataFrame;

use crate::issue::Issue;
use crate::util::CaseInsensitiveSet;

/// An issue and the rows it removes from the clean table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Finding {
    pub issue: Issue,
    pub rows: BTreeSet<usize>,
}

impl Finding {
    /// Finding that flags the table without rejecting rows.
    pub fn table(issue: Issue) -> Self {
        Self {
            issue,
            rows: BTreeSet::new(),
        }
    }

    pub fn rows(issue: Issue, rows: BTreeSet<usize>) -> Self {
        Self { issue, rows }
    }
}

/// Inputs shared by every check.
pub(crate) struct CheckContext<'a> {
    pub schema: &'a DatasetSchema,
    pub df: &'a DataFrame,
    pub columns: CaseInsensitiveSet,
    pub options: &'a ValidationOptions,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        schema: &'a DatasetSchema,
        df: &'a DataFrame,
        options: &'a ValidationOptions,
    ) -> Self {
        Self {
            schema,
            df,
            columns: CaseInsensitiveSet::from_frame(df),
            options,
        }
    }
}

/// Distinct sample values, capped at the configured maximum.
#[derive(Debug, Default)]
pub(crate) struct Samples {
    limit: usize,
    values: Vec<String>,
}

impl Samples {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, value: String) {
        if self.values.len() < self.limit && !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}

/// Run all validation checks on a dataset table.
pub(crate) fn run_all(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    // 1. Column set against the declared schema
    findings.extend(schema::check(ctx));

    // 2. Required columns present and populated
    findings.extend(presence::check(ctx));

    // 3. Numeric columns hold numbers
    findings.extend(datatype::check(ctx));

    // 4. Coordinate, year and declared bounds
    findings.extend(range::check(ctx));

    // 5. Identifier uniqueness
    findings.extend(keys::check(ctx));

    // 6. Consumption balance
    findings.extend(balance::check(ctx));

    findings
}
