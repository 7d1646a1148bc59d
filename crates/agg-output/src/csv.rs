//! Clean table CSV output.

use std::path::Path;

use agg_model::DatasetSchema;
use agg_model::schema::header_key;
use polars::prelude::{CsvWriter, DataFrame, PolarsResult, SerWriter};
use tracing::info;

use crate::atomic::write_atomic;
use crate::error::{OutputError, Result};

/// File name of a dataset's clean table.
pub fn output_file_name(schema: &DatasetSchema) -> String {
    schema
        .output_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("{}_clean.csv", schema.kind), str::to_string)
}

/// Columns in declared order, followed by any columns the schema does not
/// name in their current order.
pub fn canonical_frame(schema: &DatasetSchema, df: &DataFrame) -> PolarsResult<DataFrame> {
    let present = df.get_column_names_owned();
    let mut ordered = Vec::with_capacity(present.len());
    for column in &schema.columns {
        let key = header_key(&column.name);
        if let Some(name) = present.iter().find(|n| header_key(n.as_str()) == key) {
            ordered.push(name.clone());
        }
    }
    for name in &present {
        if !ordered.contains(name) {
            ordered.push(name.clone());
        }
    }
    df.select(ordered)
}

/// Writes `df` as CSV with a header row.
pub fn write_clean_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    write_atomic(path, |writer, temp| {
        CsvWriter::new(writer)
            .include_header(true)
            .finish(df)
            .map_err(|source| OutputError::Csv {
                path: temp.to_path_buf(),
                source,
            })
    })?;
    info!(path = %path.display(), rows = df.height(), "wrote clean table");
    Ok(())
}
