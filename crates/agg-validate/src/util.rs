//! Column lookup helpers shared by the checks.

use std::collections::HashMap;

use agg_model::schema::header_key;
use polars::prelude::{AnyValue, DataFrame};

/// Column names of a table, looked up without regard to case or spacing.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveSet {
    /// Maps normalized name -> original name
    inner: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn from_frame(df: &DataFrame) -> Self {
        Self {
            inner: df
                .get_column_names_owned()
                .into_iter()
                .map(|name| (header_key(name.as_str()), name.to_string()))
                .collect(),
        }
    }

    pub fn contains(&self, value: impl AsRef<str>) -> bool {
        self.inner.contains_key(&header_key(value.as_ref()))
    }

    /// Original column name for a schema column.
    pub fn get(&self, value: impl AsRef<str>) -> Option<&str> {
        self.inner.get(&header_key(value.as_ref())).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Cell at `idx`, or null when the column or row is absent.
pub(crate) fn cell<'a>(df: &'a DataFrame, column: &str, idx: usize) -> AnyValue<'a> {
    df.column(column)
        .ok()
        .and_then(|c| c.get(idx).ok())
        .unwrap_or(AnyValue::Null)
}
