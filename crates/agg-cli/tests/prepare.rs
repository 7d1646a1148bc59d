use std::fs;
use std::path::Path;

use agg_cli::pipeline::{REPORT_FILE_NAME, prepare, validate_file};
use agg_model::{DatasetKind, PrepareOptions, ValidationOptions};
use agg_standards::load_default_registry;

const GHGP_HEADER: &str = "Facility Id,FRS Id,Facility Name,City,State,Zip Code,Address,County,Latitude,Longitude,Primary NAICS Code,Industry Type (subparts),Industry Type (sectors),Cement Production\n";

fn write_sources(dir: &Path) {
    fs::write(
        dir.join("ds140-construction_sand_and_gravel_consumption_1902_2022.csv"),
        "Year,Production,Imports,Exports,Apparent consumption\n\
         1950,\"100,000\",0,0,\"100,000\"\n\
         1951,110,0,0,500\n\
         abc,1,1,1,1\n",
    )
    .unwrap();
    fs::write(
        dir.join("ghgp_data_2014.csv"),
        format!(
            "{GHGP_HEADER}1000001,110000,Ash Grove,Chanute,KS,66720,1801 N Santa Fe,NEOSHO COUNTY,37.68,-95.45,327310,\"C,H\",Minerals,\n\
             1000002,110001,Bad Coordinates,Chanute,KS,66720,1 Main St,NEOSHO COUNTY,95.0,-95.45,327310,H,Minerals,\n"
        ),
    )
    .unwrap();
}

fn options(output_dir: &Path) -> PrepareOptions {
    PrepareOptions {
        datasets: vec![DatasetKind::Mine, DatasetKind::Clinker, DatasetKind::Consumption],
        output_dir: Some(output_dir.to_path_buf()),
        ..PrepareOptions::default()
    }
}

#[test]
fn prepare_writes_clean_tables_and_report() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(data.path());
    let registry = load_default_registry().unwrap();

    let result = prepare(&registry, data.path(), &options(out.path()), None).unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.skipped, vec![DatasetKind::Mine]);
    let kinds: Vec<DatasetKind> = result.datasets.iter().map(|run| run.kind).collect();
    assert_eq!(kinds, vec![DatasetKind::Clinker, DatasetKind::Consumption]);

    let clinker = result.datasets[0].validation();
    assert_eq!(clinker.rows, 2);
    assert_eq!(clinker.rejected, 1);
    assert!(result.has_validation_errors());

    let consumption = &result.datasets[1];
    assert_eq!(consumption.records, 2);
    assert_eq!(consumption.dropped(), 1);
    assert_eq!(consumption.validation().warning_count(), 1);

    let cement = fs::read_to_string(out.path().join("all_cement_production.csv")).unwrap();
    assert_eq!(cement.lines().count(), 2);
    assert!(cement.contains("Ash Grove"));
    assert!(!cement.contains("Bad Coordinates"));

    let report_path = result.report_path.clone().unwrap();
    assert_eq!(report_path, out.path().join(REPORT_FILE_NAME));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["datasets"].as_array().unwrap().len(), 2);
    assert_eq!(json["datasets"][1]["dropped"]["invalid"], 1);
    assert_eq!(json["registry_fingerprint"], registry.fingerprint());
}

#[test]
fn dry_run_writes_nothing() {
    let data = tempfile::tempdir().unwrap();
    write_sources(data.path());
    let registry = load_default_registry().unwrap();
    let output_dir = data.path().join("output");
    let mut options = options(&output_dir);
    options.dry_run = true;

    let result = prepare(&registry, data.path(), &options, None).unwrap();
    assert_eq!(result.datasets.len(), 2);
    assert!(result.report_path.is_none());
    assert!(result.datasets.iter().all(|run| run.report.output.is_none()));
    assert!(!output_dir.exists());
}

#[test]
fn written_tables_validate_again() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(data.path());
    let registry = load_default_registry().unwrap();
    prepare(&registry, data.path(), &options(out.path()), None).unwrap();

    let result = validate_file(
        &registry,
        &out.path().join("sand_consumption.csv"),
        DatasetKind::Consumption,
        &ValidationOptions::default(),
        None,
    )
    .unwrap();
    let report = &result.report.validation;
    assert_eq!(report.rows, 2);
    assert!(!report.has_errors(), "{:?}", report.issues);
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn datasets_failures_do_not_stop_the_run() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(data.path());
    fs::write(
        data.path().join("USGS_Aggregates_Data_1971_2023.csv"),
        "Commodity,Quantity\nStone,1\n",
    )
    .unwrap();
    let registry = load_default_registry().unwrap();

    let options = PrepareOptions {
        output_dir: Some(out.path().to_path_buf()),
        ..PrepareOptions::default()
    };
    let result = prepare(&registry, data.path(), &options, None).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("production:"));
    assert_eq!(result.datasets.len(), 2);
}

#[test]
fn clinker_files_outside_the_reporting_years_are_rejected() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(data.path());
    fs::write(
        data.path().join("ghgp_data_2022.csv"),
        format!(
            "{GHGP_HEADER}1000003,110002,Lehigh,Union Bridge,MD,21791,675 Quaker Hill Rd,CARROLL COUNTY,39.57,-77.17,327310,\"C,H\",Minerals,\n"
        ),
    )
    .unwrap();
    let registry = load_default_registry().unwrap();

    let result = prepare(&registry, data.path(), &options(out.path()), None).unwrap();
    let clinker = result.datasets[0].validation();
    assert_eq!(clinker.rows, 3);
    assert_eq!(clinker.rejected, 2);
    assert!(clinker.issues.iter().any(|issue| issue.rule_id == "AGG006"));

    let cement = fs::read_to_string(out.path().join("all_cement_production.csv")).unwrap();
    assert_eq!(cement.lines().count(), 2);
    assert!(!cement.contains("Lehigh"));
}
