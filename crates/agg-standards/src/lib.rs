#![deny(unsafe_code)]

//! Schema registry.
//!
//! Canonical column definitions for every dataset family live as CSV files
//! under `standards/`; this crate loads them into a [`SchemaRegistry`].

pub mod csv_utils;
pub mod error;
pub mod loaders;
pub mod registry;

pub use crate::csv_utils::{STANDARDS_ENV_VAR, default_standards_root};
pub use crate::error::{Result, StandardsError};
pub use crate::loaders::{load_datasets, load_states, load_variables};
pub use crate::registry::{RegistrySummary, SchemaRegistry, StandardsFile};

/// Loads the registry from `dir`.
pub fn load_registry(dir: &std::path::Path) -> Result<SchemaRegistry> {
    SchemaRegistry::load(dir)
}

/// Loads the registry from the default standards directory.
pub fn load_default_registry() -> Result<SchemaRegistry> {
    load_registry(&default_standards_root())
}
