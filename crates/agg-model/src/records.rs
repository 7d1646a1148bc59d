//! Typed clean records, one struct per dataset family.
//!
//! Records are built once by the normalizer and never mutated. `Record`
//! turns a slice of them into a Polars frame whose column names and order
//! follow the registry.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::enums::MineStatus;

/// A clean record of one dataset family.
pub trait Record: Sized {
    const DATASET: DatasetKind;
    /// Canonical column names in output order.
    const COLUMNS: &'static [&'static str];

    /// Builds a frame holding `records` in canonical column order.
    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame>;
}

fn text<'a, R: 'a>(name: &str, records: &'a [R], get: impl Fn(&'a R) -> &'a str) -> Column {
    let values: Vec<&str> = records.iter().map(get).collect();
    Series::new(name.into(), values).into_column()
}

fn float<R>(name: &str, records: &[R], get: impl Fn(&R) -> f64) -> Column {
    let values: Vec<f64> = records.iter().map(get).collect();
    Series::new(name.into(), values).into_column()
}

fn opt_float<R>(name: &str, records: &[R], get: impl Fn(&R) -> Option<f64>) -> Column {
    let values: Vec<Option<f64>> = records.iter().map(get).collect();
    Series::new(name.into(), values).into_column()
}

fn year<R>(name: &str, records: &[R], get: impl Fn(&R) -> i32) -> Column {
    let values: Vec<i32> = records.iter().map(get).collect();
    Series::new(name.into(), values).into_column()
}

fn count<R>(name: &str, records: &[R], get: impl Fn(&R) -> Option<i64>) -> Column {
    let values: Vec<Option<i64>> = records.iter().map(get).collect();
    Series::new(name.into(), values).into_column()
}

/// An MSHA mine with a geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineRecord {
    pub mine_id: String,
    pub mine_name: String,
    pub mine_status: Option<MineStatus>,
    pub mine_type: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Record for MineRecord {
    const DATASET: DatasetKind = DatasetKind::Mine;
    const COLUMNS: &'static [&'static str] = &[
        "Mine ID",
        "Mine Name",
        "Mine Status",
        "Type of Mine",
        "Street",
        "City",
        "State",
        "Zip Code",
        "Latitude",
        "Longitude",
    ];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        let statuses: Vec<&str> = records
            .iter()
            .map(|r| r.mine_status.as_ref().map_or("", MineStatus::label))
            .collect();
        DataFrame::new(vec![
            text(c[0], records, |r| r.mine_id.as_str()),
            text(c[1], records, |r| r.mine_name.as_str()),
            Series::new(c[2].into(), statuses).into_column(),
            text(c[3], records, |r| r.mine_type.as_str()),
            text(c[4], records, |r| r.street.as_str()),
            text(c[5], records, |r| r.city.as_str()),
            text(c[6], records, |r| r.state.as_str()),
            text(c[7], records, |r| r.zip_code.as_str()),
            float(c[8], records, |r| r.latitude),
            float(c[9], records, |r| r.longitude),
        ])
    }
}

/// A GHGRP cement producer for one reporting year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinkerRecord {
    pub facility_id: String,
    pub facility_name: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub address: String,
    pub county: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported cement production. The source does not state units.
    pub cement_production: Option<f64>,
    pub year: i32,
}

impl Record for ClinkerRecord {
    const DATASET: DatasetKind = DatasetKind::Clinker;
    const COLUMNS: &'static [&'static str] = &[
        "Facility Id",
        "Facility Name",
        "City",
        "State",
        "Zip Code",
        "Address",
        "County",
        "Latitude",
        "Longitude",
        "Cement Production",
        "year",
    ];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        DataFrame::new(vec![
            text(c[0], records, |r| r.facility_id.as_str()),
            text(c[1], records, |r| r.facility_name.as_str()),
            text(c[2], records, |r| r.city.as_str()),
            text(c[3], records, |r| r.state.as_str()),
            text(c[4], records, |r| r.zip_code.as_str()),
            text(c[5], records, |r| r.address.as_str()),
            text(c[6], records, |r| r.county.as_str()),
            float(c[7], records, |r| r.latitude),
            float(c[8], records, |r| r.longitude),
            opt_float(c[9], records, |r| r.cement_production),
            year(c[10], records, |r| r.year),
        ])
    }
}

/// National apparent consumption for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub year: i32,
    pub production: f64,
    pub imports: f64,
    pub exports: f64,
    pub apparent_consumption: f64,
}

impl ConsumptionRecord {
    /// Production plus imports minus exports.
    pub fn derived_consumption(&self) -> f64 {
        self.production + self.imports - self.exports
    }
}

impl Record for ConsumptionRecord {
    const DATASET: DatasetKind = DatasetKind::Consumption;
    const COLUMNS: &'static [&'static str] = &[
        "Year",
        "Production",
        "Imports",
        "Exports",
        "Apparent consumption",
    ];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        DataFrame::new(vec![
            year(c[0], records, |r| r.year),
            float(c[1], records, |r| r.production),
            float(c[2], records, |r| r.imports),
            float(c[3], records, |r| r.exports),
            float(c[4], records, |r| r.apparent_consumption),
        ])
    }
}

/// State total aggregates production for one year and region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub year: i32,
    pub state: String,
    pub region: String,
    /// Metric tons.
    pub quantity: f64,
    /// US dollars.
    pub total_value: f64,
}

impl Record for ProductionRecord {
    const DATASET: DatasetKind = DatasetKind::Production;
    const COLUMNS: &'static [&'static str] =
        &["Year", "State Coverage", "Region", "Quantity", "Total Value"];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        DataFrame::new(vec![
            year(c[0], records, |r| r.year),
            text(c[1], records, |r| r.state.as_str()),
            text(c[2], records, |r| r.region.as_str()),
            float(c[3], records, |r| r.quantity),
            float(c[4], records, |r| r.total_value),
        ])
    }
}

/// Residential permits for one location and survey year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitRecord {
    pub year: i32,
    pub location: String,
    pub total: Option<i64>,
    pub num_1_units: Option<i64>,
    pub num_2_units: Option<i64>,
    pub num_3_4_units: Option<i64>,
    pub num_5_more_units: Option<i64>,
    pub num_structures_more_5_units: Option<i64>,
}

impl Record for PermitRecord {
    const DATASET: DatasetKind = DatasetKind::Permit;
    const COLUMNS: &'static [&'static str] = &[
        "year",
        "location",
        "total",
        "num_1_units",
        "num_2_units",
        "num_3_4_units",
        "num_5_more_units",
        "num_structures_more_5_units",
    ];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        DataFrame::new(vec![
            year(c[0], records, |r| r.year),
            text(c[1], records, |r| r.location.as_str()),
            count(c[2], records, |r| r.total),
            count(c[3], records, |r| r.num_1_units),
            count(c[4], records, |r| r.num_2_units),
            count(c[5], records, |r| r.num_3_4_units),
            count(c[6], records, |r| r.num_5_more_units),
            count(c[7], records, |r| r.num_structures_more_5_units),
        ])
    }
}

/// Housing units by units in structure for one geography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub geo_id: String,
    pub state_name: String,
    pub total_units: i64,
    pub single_family_detached: Option<i64>,
    pub single_family_attached: Option<i64>,
    pub units_2: Option<i64>,
    pub units_3_4: Option<i64>,
    pub units_5_9: Option<i64>,
    pub units_10_19: Option<i64>,
    pub units_20_49: Option<i64>,
    pub units_50_plus: Option<i64>,
    pub mobile_homes: Option<i64>,
    pub boat_rv_van: Option<i64>,
}

impl Record for StockRecord {
    const DATASET: DatasetKind = DatasetKind::Stock;
    const COLUMNS: &'static [&'static str] = &[
        "geo_id",
        "state_name",
        "total_units",
        "single_family_detached",
        "single_family_attached",
        "units_2",
        "units_3_4",
        "units_5_9",
        "units_10_19",
        "units_20_49",
        "units_50_plus",
        "mobile_homes",
        "boat_rv_van",
    ];

    fn to_frame(records: &[Self]) -> PolarsResult<DataFrame> {
        let c = Self::COLUMNS;
        DataFrame::new(vec![
            text(c[0], records, |r| r.geo_id.as_str()),
            text(c[1], records, |r| r.state_name.as_str()),
            count(c[2], records, |r| Some(r.total_units)),
            count(c[3], records, |r| r.single_family_detached),
            count(c[4], records, |r| r.single_family_attached),
            count(c[5], records, |r| r.units_2),
            count(c[6], records, |r| r.units_3_4),
            count(c[7], records, |r| r.units_5_9),
            count(c[8], records, |r| r.units_10_19),
            count(c[9], records, |r| r.units_20_49),
            count(c[10], records, |r| r.units_50_plus),
            count(c[11], records, |r| r.mobile_homes),
            count(c[12], records, |r| r.boat_rv_van),
        ])
    }
}
