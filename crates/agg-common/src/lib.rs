//! Shared utilities for aggstock crates.
//!
//! Polars `AnyValue` conversions and lenient numeric parsing used by the
//! normalizer, the validator and the exporter.

pub mod polars;

pub use polars::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, is_missing_value, parse_f64, parse_i64,
};
