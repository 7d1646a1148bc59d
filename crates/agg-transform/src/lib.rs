//! Dataset normalization.
//!
//! Turns the raw tables read by `agg-ingest` into typed clean records:
//!
//! - **Column resolution**: canonical columns are found through the
//!   registry's names and aliases ([`ColumnResolver`])
//! - **Value coercion**: numbers, counts, years, coordinates, ZIP codes
//!   ([`normalization`])
//! - **Dataset rules**: one [`DatasetNormalizer`] per dataset family applies
//!   that family's filters, joins and aggregation
//!
//! Rows that do not become records are kept as [`RowDrop`]s with a
//! [`DropReason`], so nothing disappears without a trace.

mod datasets;
mod error;
mod outcome;
mod resolver;

pub mod normalization;

pub use datasets::{
    CEMENT_INDUSTRY_CODES, ClinkerNormalizer, ConsumptionNormalizer, DatasetNormalizer,
    MineNormalizer, NormalizeContext, PERMIT_DATA_COLUMNS, PermitNormalizer,
    ProductionNormalizer, StockNormalizer, normalize_dataset,
};
pub use error::{Result, TransformError};
pub use outcome::{DropReason, Normalized, NormalizedTable, RowDrop};
pub use resolver::ColumnResolver;
