//! `prepare` and `validate` orchestration.
//!
//! Datasets are processed one after another: sources are loaded, normalized,
//! validated, and the accepted rows written out. A dataset that fails is
//! recorded and the run moves on to the next one.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use agg_geocode::Geocoder;
use agg_ingest::{
    DiscoveredFile, discover_dataset_files, list_csv_files, load_dataset_sources, read_csv_table,
};
use agg_model::{DatasetKind, DatasetSchema, PrepareOptions, ReadOptions, ValidationOptions};
use agg_output::{DatasetReport, write_dataset_table, write_validation_report};
use agg_standards::SchemaRegistry;
use agg_transform::{NormalizeContext, normalize_dataset};
use agg_validate::validate_dataset;

use crate::types::{DatasetRun, PrepareResult, ValidateResult};

pub const REPORT_FILE_NAME: &str = "validation_report.json";

/// Runs every selected dataset found in `data_dir`.
pub fn prepare(
    registry: &SchemaRegistry,
    data_dir: &Path,
    options: &PrepareOptions,
    geocoder: Option<&dyn Geocoder>,
) -> Result<PrepareResult> {
    let span = info_span!("prepare", data_dir = %data_dir.display());
    let _guard = span.enter();

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("output"));
    let files = list_csv_files(data_dir)
        .with_context(|| format!("list CSV files in {}", data_dir.display()))?;
    let discovered = discover_dataset_files(&files);
    info!(files = files.len(), datasets = discovered.len(), "discovery complete");

    let mut result = PrepareResult {
        data_dir: data_dir.to_path_buf(),
        output_dir: output_dir.clone(),
        dry_run: options.dry_run,
        datasets: Vec::new(),
        skipped: Vec::new(),
        errors: Vec::new(),
        report_path: None,
    };

    for kind in DatasetKind::ALL {
        if !options.includes(kind) {
            continue;
        }
        let Some(found) = discovered.get(&kind).filter(|found| !found.is_empty()) else {
            warn!(dataset = %kind, "no source files found");
            result.skipped.push(kind);
            continue;
        };
        let outcome = registry
            .get(kind)
            .map_err(anyhow::Error::from)
            .and_then(|schema| run_dataset(schema, found, options, geocoder, &output_dir));
        match outcome {
            Ok(run) => result.datasets.push(run),
            Err(err) => {
                error!(dataset = %kind, "{err:#}");
                result.errors.push(format!("{kind}: {err:#}"));
            }
        }
    }

    if !options.dry_run && !result.datasets.is_empty() {
        let reports: Vec<DatasetReport> =
            result.datasets.iter().map(|run| run.report.clone()).collect();
        let path = write_validation_report(
            &registry.fingerprint(),
            &reports,
            &output_dir.join(REPORT_FILE_NAME),
        )
        .context("write validation report")?;
        result.report_path = Some(path);
    }
    Ok(result)
}

fn run_dataset(
    schema: &DatasetSchema,
    files: &[DiscoveredFile],
    options: &PrepareOptions,
    geocoder: Option<&dyn Geocoder>,
    output_dir: &Path,
) -> Result<DatasetRun> {
    let kind = schema.kind;
    let span = info_span!("dataset", dataset = %kind);
    let _guard = span.enter();

    let sources = load_dataset_sources(kind, files).context("load sources")?;
    let mut ctx = NormalizeContext::new(schema);
    if let Some(geocoder) = geocoder {
        ctx = ctx.with_geocoder(geocoder);
    }
    let table = normalize_dataset(&sources, &ctx).context("normalize")?;

    let outcome = validate_dataset(schema, &table.frame, &options.validation);
    let accepted = outcome
        .accepted_frame(&table.frame)
        .context("filter rejected rows")?;
    let mut report = DatasetReport::new(outcome.report).with_dropped(table.drop_counts());
    if !options.dry_run {
        let output = write_dataset_table(schema, &accepted, output_dir).context("write table")?;
        report = report.with_output(output);
    }

    Ok(DatasetRun {
        kind,
        label: schema.label.clone(),
        files: sources.tables.len() + usize::from(sources.addresses.is_some()),
        source_rows: sources.row_count(),
        records: table.records,
        report,
    })
}

/// Validates an existing clean table read from `csv`.
pub fn validate_file(
    registry: &SchemaRegistry,
    csv: &Path,
    kind: DatasetKind,
    options: &ValidationOptions,
    report_path: Option<&Path>,
) -> Result<ValidateResult> {
    let span = info_span!("validate_file", dataset = %kind, path = %csv.display());
    let _guard = span.enter();

    let schema = registry.get(kind)?;
    let table = read_csv_table(csv, &ReadOptions::default())
        .with_context(|| format!("read {}", csv.display()))?;
    let frame = table.to_frame()?;
    let outcome = validate_dataset(schema, &frame, options);
    let mut report = DatasetReport::new(outcome.report);
    if !table.malformed.is_empty() {
        report = report.with_dropped([("malformed", table.malformed.len())]);
    }

    let report_path = match report_path {
        Some(path) => Some(
            write_validation_report(&registry.fingerprint(), std::slice::from_ref(&report), path)
                .context("write validation report")?,
        ),
        None => None,
    };
    Ok(ValidateResult {
        path: csv.to_path_buf(),
        report,
        report_path,
    })
}
