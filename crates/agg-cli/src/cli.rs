//! CLI argument definitions for aggstock.

use std::path::PathBuf;

use agg_cli::logging::LogFormat;
use agg_model::DatasetKind;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "aggstock",
    version,
    about = "Prepare clean aggregates and cement datasets from public sources",
    long_about = "Read raw MSHA, USGS, EPA GHGRP and Census CSV downloads, normalize them \
                  into canonical tables and validate them against the schema registry.\n\n\
                  Clean tables are written as CSV next to a JSON validation report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory holding Datasets.csv, Variables.csv and States.csv.
    #[arg(long = "standards-dir", value_name = "DIR", global = true)]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize, validate and export the datasets found in a data folder.
    Prepare(PrepareArgs),

    /// Validate an existing clean table against its schema.
    Validate(ValidateArgs),

    /// List the datasets known to the schema registry.
    Datasets(DatasetsArgs),
}

#[derive(Parser)]
pub struct PrepareArgs {
    /// Folder containing the raw CSV downloads.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Output directory for clean tables (default: <DATA_DIR>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only process this dataset (repeatable).
    #[arg(long = "dataset", value_name = "KIND", value_parser = parse_dataset)]
    pub datasets: Vec<DatasetKind>,

    /// Validate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Look up missing mine coordinates with the Census geocoder.
    #[arg(long = "geocode")]
    pub geocode: bool,

    /// TOML file with run options; flags given here take precedence.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Exit with status 1 when any dataset has validation errors.
    #[arg(long = "fail-on-errors")]
    pub fail_on_errors: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Clean table to check.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Dataset the table belongs to.
    #[arg(long = "dataset", value_name = "KIND", value_parser = parse_dataset)]
    pub dataset: DatasetKind,

    /// Also write the JSON validation report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Exit with status 1 when the table has validation errors.
    #[arg(long = "fail-on-errors")]
    pub fail_on_errors: bool,
}

#[derive(Parser)]
pub struct DatasetsArgs {
    /// Print the registry summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

fn parse_dataset(value: &str) -> Result<DatasetKind, String> {
    value.parse().map_err(|e: agg_model::ModelError| e.to_string())
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_accepts_repeated_datasets() {
        let cli = Cli::try_parse_from([
            "aggstock",
            "prepare",
            "data",
            "--dataset",
            "mines",
            "--dataset",
            "Clinker",
            "--dry-run",
        ])
        .unwrap();
        let Command::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        assert_eq!(args.datasets, vec![DatasetKind::Mine, DatasetKind::Clinker]);
        assert!(args.dry_run);
        assert!(!args.geocode);
    }

    #[test]
    fn unknown_dataset_is_rejected() {
        let parsed = Cli::try_parse_from(["aggstock", "validate", "x.csv", "--dataset", "gravel"]);
        assert!(parsed.is_err());
    }
}
