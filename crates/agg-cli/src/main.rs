//! aggstock command line.

use std::io::{self, IsTerminal};

use agg_cli::logging::{LogConfig, init_logging};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod progress;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{
    load_standards, prepare_options, run_datasets, run_prepare, run_validate,
};
use crate::summary::{print_prepare_summary, print_validate_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let registry = load_standards(cli)?;
    match &cli.command {
        Command::Prepare(args) => {
            let options = prepare_options(args)?;
            let quiet = matches!(cli.log_format, LogFormatArg::Json) || cli.log_file.is_some();
            let result = run_prepare(&registry, args, &options, quiet)?;
            print_prepare_summary(&result);
            let failed = !result.errors.is_empty()
                || (options.fail_on_errors && result.has_validation_errors());
            Ok(i32::from(failed))
        }
        Command::Validate(args) => {
            let result = run_validate(&registry, args)?;
            print_validate_summary(&result);
            Ok(i32::from(
                args.fail_on_errors && result.report.validation.has_errors(),
            ))
        }
        Command::Datasets(args) => {
            run_datasets(&registry, args)?;
            Ok(0)
        }
    }
}

/// Explicit verbosity flags and `--log-level` win over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit_level = cli.verbosity.is_present() || cli.log_level.is_some();
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from),
        use_env_filter: !explicit_level,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        with_ansi,
        ..LogConfig::default()
    }
}
