use std::fs;

use agg_model::{
    ClinkerRecord, ColumnType, ConsumptionRecord, DatasetKind, MineRecord, PermitRecord,
    ProductionRecord, Record, StockRecord,
};
use agg_standards::{SchemaRegistry, StandardsError, load_default_registry};

fn assert_columns_match<R: Record>(registry: &SchemaRegistry) {
    let schema = registry.get(R::DATASET).expect("schema");
    assert_eq!(
        schema.column_names(),
        R::COLUMNS,
        "registry and record columns differ for {}",
        R::DATASET
    );
}

#[test]
fn loads_every_dataset() {
    let registry = load_default_registry().expect("load registry");
    for kind in DatasetKind::ALL {
        let schema = registry.get(kind).expect("schema");
        assert!(!schema.columns.is_empty(), "{kind} has no columns");
        assert!(!schema.key_columns().is_empty(), "{kind} has no key");
    }
}

#[test]
fn record_types_follow_registry_order() {
    let registry = load_default_registry().expect("load registry");
    assert_columns_match::<MineRecord>(&registry);
    assert_columns_match::<ClinkerRecord>(&registry);
    assert_columns_match::<ConsumptionRecord>(&registry);
    assert_columns_match::<ProductionRecord>(&registry);
    assert_columns_match::<PermitRecord>(&registry);
    assert_columns_match::<StockRecord>(&registry);
}

#[test]
fn clinker_covers_2010_to_2021() {
    let registry = load_default_registry().expect("load registry");
    let clinker = registry.get(DatasetKind::Clinker).expect("clinker");
    let years = clinker.years.expect("year range");
    assert_eq!((years.min, years.max), (2010, 2021));
    let keys: Vec<&str> = clinker
        .key_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(keys, vec!["Facility Id", "year"]);
}

#[test]
fn permit_and_stock_are_provisional() {
    let registry = load_default_registry().expect("load registry");
    assert!(registry.get(DatasetKind::Permit).unwrap().is_provisional());
    assert!(registry.get(DatasetKind::Stock).unwrap().is_provisional());
    assert!(!registry.get(DatasetKind::Mine).unwrap().is_provisional());
}

#[test]
fn mine_coordinates_are_typed() {
    let registry = load_default_registry().expect("load registry");
    let mine = registry.get(DatasetKind::Mine).unwrap();
    let lat = mine.column("latitude").expect("latitude");
    assert_eq!(lat.column_type, ColumnType::Latitude);
    assert_eq!(lat.bounds(), (Some(-90.0), Some(90.0)));
    assert!(lat.matches_header("lat"));
    assert!(mine.column("mine name_x").is_none());
    assert!(mine.column("Mine Name").unwrap().matches_header("Mine Name_x"));
}

#[test]
fn state_lookup_works_both_ways() {
    let registry = load_default_registry().expect("load registry");
    assert_eq!(registry.state_name("tx"), Some("Texas"));
    assert_eq!(registry.state_abbrev("new mexico"), Some("NM"));
    assert_eq!(registry.state_name("ZZ"), None);
}

#[test]
fn missing_dataset_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Datasets.csv"),
        "Dataset,Label,Source,Source URL,Documented,Year Min,Year Max,Output Name\n\
         mine,Mines,MSHA,,Y,,,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("Variables.csv"),
        "Dataset,Order,Column Name,Label,Type,Core,Key,Min,Max,Aliases\n\
         mine,1,Mine ID,Id,Char,Req,Y,,,\n",
    )
    .unwrap();
    fs::write(dir.path().join("States.csv"), "Abbreviation,Name\nAL,Alabama\n").unwrap();

    let err = SchemaRegistry::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        StandardsError::MissingDataset { ref dataset } if dataset == "production"
    ));
}

#[test]
fn summary_lists_keys_and_digests() {
    let registry = load_default_registry().expect("load registry");
    let summary = registry.summary();
    assert_eq!(summary.schema, "aggstock.schema-registry");
    assert_eq!(summary.files.len(), 3);
    assert!(summary.files.iter().all(|f| f.sha256.len() == 64));
    assert_eq!(summary.fingerprint, registry.fingerprint());

    let keys: Vec<(String, Vec<String>)> = summary
        .datasets
        .iter()
        .map(|d| (d.dataset.to_string(), d.keys.clone()))
        .collect();
    insta::assert_json_snapshot!(keys, @r#"
    [
      [
        "mine",
        [
          "Mine ID"
        ]
      ],
      [
        "production",
        [
          "Year",
          "State Coverage",
          "Region"
        ]
      ],
      [
        "clinker",
        [
          "Facility Id",
          "year"
        ]
      ],
      [
        "consumption",
        [
          "Year"
        ]
      ],
      [
        "permit",
        [
          "year",
          "location"
        ]
      ],
      [
        "stock",
        [
          "geo_id"
        ]
      ]
    ]
    "#);
}
