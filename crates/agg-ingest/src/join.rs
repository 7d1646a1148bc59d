//! Inner join of two raw tables on a shared key column.

use std::collections::HashMap;

use tracing::debug;

use crate::csv_table::{RawRow, RawTable};
use crate::error::Result;

/// Inner-joins `left` and `right` on `key`.
///
/// Output columns are the key, the remaining left columns and the remaining
/// right columns. A non-key header present on both sides gets `_x` on the
/// left and `_y` on the right. A left row matching several right rows yields
/// one output row per match. Rows with an empty key never match.
pub fn join_on(left: &RawTable, right: &RawTable, key: &str) -> Result<RawTable> {
    let left_key = left.require_column(key)?;
    let right_key = right.require_column(key)?;

    let upper = |h: &String| h.to_uppercase();
    let left_names: Vec<String> = left.headers.iter().map(upper).collect();
    let right_names: Vec<String> = right.headers.iter().map(upper).collect();

    let mut headers = vec![left.headers[left_key].clone()];
    for (idx, header) in left.headers.iter().enumerate() {
        if idx == left_key {
            continue;
        }
        let collides = right_names
            .iter()
            .enumerate()
            .any(|(r, name)| r != right_key && *name == left_names[idx]);
        headers.push(if collides {
            format!("{header}_x")
        } else {
            header.clone()
        });
    }
    for (idx, header) in right.headers.iter().enumerate() {
        if idx == right_key {
            continue;
        }
        let collides = left_names
            .iter()
            .enumerate()
            .any(|(l, name)| l != left_key && *name == right_names[idx]);
        headers.push(if collides {
            format!("{header}_y")
        } else {
            header.clone()
        });
    }

    let mut index: HashMap<&str, Vec<&RawRow>> = HashMap::new();
    for row in &right.rows {
        let value = row.cells[right_key].as_str();
        if !value.is_empty() {
            index.entry(value).or_default().push(row);
        }
    }

    let mut rows = Vec::new();
    for row in &left.rows {
        let value = row.cells[left_key].as_str();
        let Some(matches) = index.get(value) else {
            continue;
        };
        for matched in matches {
            let mut cells = Vec::with_capacity(headers.len());
            cells.push(value.to_string());
            cells.extend(
                row.cells
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != left_key)
                    .map(|(_, cell)| cell.clone()),
            );
            cells.extend(
                matched
                    .cells
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != right_key)
                    .map(|(_, cell)| cell.clone()),
            );
            rows.push(RawRow {
                line: row.line,
                cells,
            });
        }
    }

    debug!(
        key,
        left = left.height(),
        right = right.height(),
        joined = rows.len(),
        "joined raw tables"
    );

    let mut malformed = left.malformed.clone();
    malformed.extend(right.malformed.iter().cloned());
    Ok(RawTable {
        source: left.source.clone(),
        headers,
        rows,
        malformed,
    })
}
