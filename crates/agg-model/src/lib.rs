pub mod dataset;
pub mod enums;
pub mod error;
pub mod options;
pub mod records;
pub mod schema;

pub use dataset::DatasetKind;
pub use enums::{ColumnType, CoreDesignation, MineStatus};
pub use error::{ModelError, Result};
pub use options::{GeocodeOptions, PrepareOptions, ReadOptions, ValidationOptions};
pub use records::{
    ClinkerRecord, ConsumptionRecord, MineRecord, PermitRecord, ProductionRecord, Record,
    StockRecord,
};
pub use schema::{ColumnDef, DatasetSchema, YearRange};
