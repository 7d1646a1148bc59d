use agg_model::{DatasetKind, ValidationOptions};
use agg_output::{
    DatasetReport, REPORT_SCHEMA, file_sha256, write_dataset_table, write_validation_report,
};
use agg_standards::load_default_registry;
use agg_validate::validate_dataset;
use polars::prelude::*;

fn consumption_report() -> (DataFrame, DatasetReport) {
    let registry = load_default_registry().unwrap();
    let schema = registry.get(DatasetKind::Consumption).unwrap();
    let df = df!(
        "Exports" => [0.0, 0.0],
        "Year" => [1950i64, 1951],
        "Production" => [100.0, 110.0],
        "Imports" => [0.0, 0.0],
        "Apparent consumption" => [150.0, 110.0],
    )
    .unwrap();
    let outcome = validate_dataset(schema, &df, &ValidationOptions::default());
    let report = DatasetReport::new(outcome.report)
        .with_dropped([("invalid", 2), ("missing_required", 1)]);
    (df, report)
}

#[test]
fn report_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("validation_report.json");
    let (_, report) = consumption_report();
    write_validation_report("test-fingerprint", &[report], &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("}\n"));
    let mut json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["schema"], REPORT_SCHEMA);
    let generated = json
        .as_object_mut()
        .unwrap()
        .remove("generated_at")
        .unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(generated.as_str().unwrap()).is_ok());
    insta::assert_json_snapshot!("consumption_report", json);
}

#[test]
fn table_is_written_in_canonical_order() {
    let dir = tempfile::tempdir().unwrap();
    let registry = load_default_registry().unwrap();
    let schema = registry.get(DatasetKind::Consumption).unwrap();
    let (df, report) = consumption_report();

    let output = write_dataset_table(schema, &df, dir.path()).unwrap();
    assert_eq!(output.path, dir.path().join("sand_consumption.csv"));
    assert_eq!(output.rows, 2);
    assert_eq!(output.sha256, file_sha256(&output.path).unwrap());
    let text = std::fs::read_to_string(&output.path).unwrap();
    assert!(text.starts_with("Year,Production,Imports,Exports,Apparent consumption\n"));
    assert!(!dir.path().join("sand_consumption.csv.tmp").exists());

    let report = report.with_output(output.clone());
    let path = dir.path().join("report.json");
    write_validation_report("fp", &[report], &path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["datasets"][0]["output"]["rows"], 2);
    assert_eq!(json["datasets"][0]["output"]["sha256"], output.sha256.as_str());
}
