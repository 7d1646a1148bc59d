use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info;

use agg_cli::pipeline::{prepare, validate_file};
use agg_cli::types::{PrepareResult, ValidateResult};
use agg_geocode::{CensusGeocoder, Geocoder};
use agg_model::{PrepareOptions, ValidationOptions};
use agg_standards::{SchemaRegistry, load_default_registry, load_registry};

use crate::cli::{Cli, DatasetsArgs, PrepareArgs, ValidateArgs};
use crate::progress::ProgressGeocoder;
use crate::summary::apply_table_style;

pub fn load_standards(cli: &Cli) -> Result<SchemaRegistry> {
    match &cli.standards_dir {
        Some(dir) => load_registry(dir)
            .with_context(|| format!("load standards from {}", dir.display())),
        None => load_default_registry().context("load standards"),
    }
}

/// Options from the config file, with command line flags layered on top.
pub fn prepare_options(args: &PrepareArgs) -> Result<PrepareOptions> {
    let mut options = match &args.config {
        Some(path) => PrepareOptions::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PrepareOptions::new(),
    };
    if !args.datasets.is_empty() {
        options.datasets = args.datasets.clone();
    }
    if args.output_dir.is_some() {
        options.output_dir = args.output_dir.clone();
    }
    options.dry_run |= args.dry_run;
    options.fail_on_errors |= args.fail_on_errors;
    options.geocode.enabled |= args.geocode;
    Ok(options)
}

pub fn run_prepare(
    registry: &SchemaRegistry,
    args: &PrepareArgs,
    options: &PrepareOptions,
    quiet: bool,
) -> Result<PrepareResult> {
    if !options.geocode.enabled {
        return prepare(registry, &args.data_dir, options, None);
    }
    let census = CensusGeocoder::new(&options.geocode).context("set up geocoder")?;
    let geocoder = ProgressGeocoder::new(census, quiet);
    let result = prepare(
        registry,
        &args.data_dir,
        options,
        Some(&geocoder as &dyn Geocoder),
    );
    let lookups = geocoder.finish();
    info!(lookups, "geocoding finished");
    result
}

pub fn run_validate(registry: &SchemaRegistry, args: &ValidateArgs) -> Result<ValidateResult> {
    validate_file(
        registry,
        &args.csv,
        args.dataset,
        &ValidationOptions::default(),
        args.report.as_deref(),
    )
}

pub fn run_datasets(registry: &SchemaRegistry, args: &DatasetsArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(&registry.summary())?;
        println!("{json}");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Dataset", "Description", "Years", "Columns", "Keys", "Output"]);
    apply_table_style(&mut table);
    for schema in registry.schemas() {
        let years = schema
            .years
            .map_or_else(|| "-".to_string(), |r| format!("{}-{}", r.min, r.max));
        let keys = schema
            .key_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let label = if schema.is_provisional() {
            format!("{} (provisional)", schema.label)
        } else {
            schema.label.clone()
        };
        table.add_row(vec![
            schema.kind.to_string(),
            label,
            years,
            schema.columns.len().to_string(),
            keys,
            agg_output::output_file_name(schema),
        ]);
    }
    println!("{table}");
    Ok(())
}
