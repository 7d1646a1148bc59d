//! One normalizer per dataset family.

mod clinker;
mod consumption;
mod mine;
mod permit;
mod production;
mod stock;

pub use clinker::{CEMENT_INDUSTRY_CODES, ClinkerNormalizer};
pub use consumption::ConsumptionNormalizer;
pub use mine::MineNormalizer;
pub use permit::{PERMIT_DATA_COLUMNS, PermitNormalizer};
pub use production::ProductionNormalizer;
pub use stock::StockNormalizer;

use agg_geocode::Geocoder;
use agg_ingest::DatasetSources;
use agg_model::{DatasetKind, DatasetSchema, Record};
use tracing::{info, info_span};

use crate::error::{Result, TransformError};
use crate::outcome::{Normalized, NormalizedTable};

/// What a normalizer may consult besides the raw sources.
#[derive(Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub schema: &'a DatasetSchema,
    /// Used to fill in missing mine coordinates when set.
    pub geocoder: Option<&'a dyn Geocoder>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(schema: &'a DatasetSchema) -> Self {
        Self {
            schema,
            geocoder: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: &'a dyn Geocoder) -> Self {
        self.geocoder = Some(geocoder);
        self
    }
}

/// Turns the raw sources of one dataset into typed records.
pub trait DatasetNormalizer {
    type Output: Record;

    fn kind(&self) -> DatasetKind {
        Self::Output::DATASET
    }

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<Self::Output>>;
}

fn run<N: DatasetNormalizer>(
    normalizer: &N,
    sources: &DatasetSources,
    ctx: &NormalizeContext<'_>,
) -> Result<NormalizedTable> {
    if sources.tables.is_empty() && sources.addresses.is_none() {
        return Err(TransformError::NoSources {
            dataset: normalizer.kind(),
        });
    }
    let normalized = normalizer.normalize(sources, ctx)?;
    info!(
        records = normalized.records.len(),
        dropped = normalized.dropped.len(),
        "normalize complete"
    );
    normalized.into_table()
}

/// Normalizes `sources` with the normalizer for their dataset.
pub fn normalize_dataset(
    sources: &DatasetSources,
    ctx: &NormalizeContext<'_>,
) -> Result<NormalizedTable> {
    let span = info_span!("normalize", dataset = %sources.kind);
    let _guard = span.enter();
    match sources.kind {
        DatasetKind::Mine => run(&MineNormalizer, sources, ctx),
        DatasetKind::Production => run(&ProductionNormalizer, sources, ctx),
        DatasetKind::Clinker => run(&ClinkerNormalizer, sources, ctx),
        DatasetKind::Consumption => run(&ConsumptionNormalizer, sources, ctx),
        DatasetKind::Permit => run(&PermitNormalizer, sources, ctx),
        DatasetKind::Stock => run(&StockNormalizer, sources, ctx),
    }
}
