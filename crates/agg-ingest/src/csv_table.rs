use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use agg_model::ReadOptions;
use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// One data row with its physical line number in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    pub cells: Vec<String>,
}

/// A source row that could not be aligned with the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub line: u64,
    pub reason: String,
}

/// A raw source table: trimmed text cells, nothing coerced yet.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub malformed: Vec<MalformedRow>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim_matches('"').trim().to_string()
}

/// Rejects UTF-16 files; UTF-8 with or without BOM is accepted.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Reads a raw CSV file according to `options`.
///
/// Rows shorter than the header are padded with empty cells. Rows with more
/// populated cells than the header are set aside in `malformed`.
pub fn read_csv_table(path: &Path, options: &ReadOptions) -> Result<RawTable> {
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records: Vec<(u64, Vec<String>)> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if idx < options.skip_rows {
            continue;
        }
        let line = record.position().map_or(idx as u64 + 1, csv::Position::line);
        let cells: Vec<String> = record.iter().map(normalize_cell).collect();
        records.push((line, cells));
    }

    let mut records = records.into_iter();
    let headers: Vec<String>;
    let mut pending = Vec::new();
    if options.has_headers {
        let Some((_, header_cells)) = records.next() else {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        };
        headers = header_cells
            .iter()
            .map(String::as_str)
            .map(normalize_header)
            .collect();
        pending.extend(records);
    } else {
        pending.extend(records);
        let width = pending.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        headers = (1..=width).map(|n| format!("column_{n}")).collect();
    }
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let width = headers.len();
    let mut table = RawTable {
        source: path.to_path_buf(),
        headers,
        rows: Vec::new(),
        malformed: Vec::new(),
    };
    for (line, mut cells) in pending {
        if cells.iter().all(String::is_empty) {
            continue;
        }
        let populated = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
        if populated > width {
            warn!(
                path = %path.display(),
                line,
                cells = populated,
                expected = width,
                "skipping malformed row"
            );
            table.malformed.push(MalformedRow {
                line,
                reason: format!("{populated} populated cells, header has {width}"),
            });
            continue;
        }
        cells.resize(width, String::new());
        table.rows.push(RawRow { line, cells });
    }

    if options.drop_empty_columns {
        table.drop_empty_columns();
    }
    debug!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        malformed = table.malformed.len(),
        "read raw table"
    );
    Ok(table)
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Index of `name`, matched case-insensitively with collapsed spaces.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let needle = normalize_header(name).to_uppercase();
        self.headers
            .iter()
            .position(|h| h.to_uppercase() == needle)
    }

    /// Like [`column_index`](Self::column_index) but fails with `MissingColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
                path: self.source.clone(),
            })
    }

    /// Removes columns whose every cell is empty.
    pub fn drop_empty_columns(&mut self) {
        let keep: Vec<bool> = (0..self.width())
            .map(|idx| self.rows.iter().any(|row| !row.cells[idx].is_empty()))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }
        self.headers = retain_by_mask(std::mem::take(&mut self.headers), &keep);
        for row in &mut self.rows {
            row.cells = retain_by_mask(std::mem::take(&mut row.cells), &keep);
        }
    }

    /// Removes columns whose header satisfies `predicate`.
    pub fn drop_columns_where(&mut self, predicate: impl Fn(&str) -> bool) {
        let keep: Vec<bool> = self.headers.iter().map(|h| !predicate(h)).collect();
        self.headers = retain_by_mask(std::mem::take(&mut self.headers), &keep);
        for row in &mut self.rows {
            row.cells = retain_by_mask(std::mem::take(&mut row.cells), &keep);
        }
    }

    /// Stacks tables with identical headers, as produced by per-year files.
    pub fn concat(tables: Vec<RawTable>) -> Result<RawTable> {
        let mut iter = tables.into_iter();
        let Some(mut combined) = iter.next() else {
            return Ok(RawTable::default());
        };
        for table in iter {
            let mut order = Vec::with_capacity(combined.width());
            for header in &combined.headers {
                order.push(table.column_index(header));
            }
            for row in table.rows {
                let cells = order
                    .iter()
                    .map(|idx| idx.map(|i| row.cells[i].clone()).unwrap_or_default())
                    .collect();
                combined.rows.push(RawRow {
                    line: row.line,
                    cells,
                });
            }
            combined.malformed.extend(table.malformed);
        }
        Ok(combined)
    }

    /// Converts the table to a frame of string columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> =
                    self.rows.iter().map(|row| row.cells[idx].as_str()).collect();
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn retain_by_mask(values: Vec<String>, keep: &[bool]) -> Vec<String> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, keep)| keep.then_some(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(contents: &[u8]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn reads_headers_and_trims_cells() {
        let file = write_csv(b"\xEF\xBB\xBFMine ID , Mine  Name\n 0100003 ,Brown Pit \n\n");
        let table = read_csv_table(file.path(), &ReadOptions::new()).unwrap();
        assert_eq!(table.headers, vec!["Mine ID", "Mine Name"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec!["0100003", "Brown Pit"]);
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn pads_short_rows_and_sets_aside_long_ones() {
        let file = write_csv(b"a,b,c\n1,2\n1,2,3,4\n5,6,7,\n");
        let table = read_csv_table(file.path(), &ReadOptions::new()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["1", "2", ""]);
        assert_eq!(table.rows[1].cells, vec!["5", "6", "7"]);
        assert_eq!(table.malformed.len(), 1);
        assert_eq!(table.malformed[0].line, 3);
    }

    #[test]
    fn headerless_with_skipped_preamble() {
        let file = write_csv(
            b"Annual permits\nUnits\n\n,Total,,1 Unit\nLocation,,,\nAlabama,\"19,101\",,\"16,209\"\n",
        );
        let options = ReadOptions::new()
            .headerless()
            .with_skip_rows(4)
            .with_drop_empty_columns(true);
        let table = read_csv_table(file.path(), &options).unwrap();
        assert_eq!(table.headers, vec!["column_1", "column_2", "column_4"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec!["Alabama", "19,101", "16,209"]);
    }

    #[test]
    fn drops_all_empty_columns() {
        let file = write_csv(b"Year,,Production\n1902,,\"24,000\"\n");
        let table = read_csv_table(
            file.path(),
            &ReadOptions::new().with_drop_empty_columns(true),
        )
        .unwrap();
        assert_eq!(table.headers, vec!["Year", "Production"]);
    }

    #[test]
    fn rejects_utf16() {
        let file = write_csv(&[0xFF, 0xFE, b'a', 0]);
        let err = read_csv_table(file.path(), &ReadOptions::new()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = write_csv(b"");
        let err = read_csv_table(file.path(), &ReadOptions::new()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyCsv { .. }));
    }

    #[test]
    fn concat_aligns_by_header() {
        let first = RawTable {
            headers: vec!["Facility Id".into(), "State".into(), "year".into()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["1000001".into(), "TX".into(), "2014".into()],
            }],
            ..RawTable::default()
        };
        let second = RawTable {
            headers: vec!["State".into(), "year".into(), "Facility Id".into()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["MO".into(), "2015".into(), "1000002".into()],
            }],
            ..RawTable::default()
        };
        let combined = RawTable::concat(vec![first, second]).unwrap();
        assert_eq!(combined.rows[1].cells, vec!["1000002", "MO", "2015"]);
    }

    #[test]
    fn to_frame_keeps_column_order() {
        let table = RawTable {
            headers: vec!["Year".into(), "Imports".into()],
            rows: vec![RawRow {
                line: 2,
                cells: vec!["1902".into(), String::new()],
            }],
            ..RawTable::default()
        };
        let df = table.to_frame().unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.get_column_names_owned()[1].as_str(), "Imports");
    }
}
