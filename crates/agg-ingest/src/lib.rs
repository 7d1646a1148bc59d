//! Source adapters for the raw dataset files.
//!
//! Discovery classifies files in a data folder by dataset, the CSV reader
//! turns one file into a [`RawTable`] of trimmed text cells, and the join
//! helper stitches split sources (MSHA mines and addresses) together.

pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod join;
pub mod sources;
pub mod year;

pub use csv_table::{MalformedRow, RawRow, RawTable, read_csv_table, validate_encoding};
pub use discovery::{DiscoveredFile, SourceRole, discover_dataset_files, list_csv_files};
pub use error::{IngestError, Result};
pub use join::join_on;
pub use sources::{
    DatasetSources, PERMIT_PREAMBLE_ROWS, SourceTable, load_dataset_sources, read_options_for,
};
pub use year::extract_year;
