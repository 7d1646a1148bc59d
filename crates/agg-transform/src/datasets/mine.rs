//! MSHA mine locations.

use agg_geocode::{Geocoder, one_line_address};
use agg_ingest::{DatasetSources, RawRow, RawTable, join_on};
use agg_model::{DatasetKind, MineRecord, MineStatus};
use tracing::{debug, warn};

use super::{DatasetNormalizer, NormalizeContext};
use crate::error::{Result, TransformError};
use crate::normalization::{clean_identifier, clean_text, normalize_zip, parse_coordinate};
use crate::outcome::{DropReason, Normalized};
use crate::resolver::ColumnResolver;

const JOIN_KEY: &str = "Mine ID";

/// Joins mines with their addresses, drops abandoned and unlocated mines.
#[derive(Debug, Clone, Copy, Default)]
pub struct MineNormalizer;

/// The mine table after joining, or the single table that was provided.
fn combined_table(sources: &DatasetSources) -> Result<RawTable> {
    let primary = match sources.tables.len() {
        0 => None,
        1 => Some(sources.tables[0].table.clone()),
        _ => Some(RawTable::concat(
            sources.tables.iter().map(|s| s.table.clone()).collect(),
        )?),
    };
    let addresses = sources.addresses.as_ref().map(|s| &s.table);
    match (primary, addresses) {
        (Some(mines), Some(addresses)) => Ok(join_on(&mines, addresses, JOIN_KEY)?),
        (Some(mines), None) => Ok(mines),
        (None, Some(addresses)) => Ok(addresses.clone()),
        (None, None) => Err(TransformError::NoSources {
            dataset: DatasetKind::Mine,
        }),
    }
}

enum Located {
    Found(f64, f64),
    Missing(&'static str),
    Invalid(&'static str, String),
}

fn read_coordinates(resolver: &ColumnResolver, row: &RawRow) -> Located {
    let lat_raw = resolver.value(row, "Latitude").trim();
    let lon_raw = resolver.value(row, "Longitude").trim();
    if lat_raw.is_empty() {
        return Located::Missing("Latitude");
    }
    if lon_raw.is_empty() {
        return Located::Missing("Longitude");
    }
    let Some(latitude) = parse_coordinate(lat_raw) else {
        return Located::Invalid("Latitude", lat_raw.to_string());
    };
    let Some(longitude) = parse_coordinate(lon_raw) else {
        return Located::Invalid("Longitude", lon_raw.to_string());
    };
    Located::Found(latitude, longitude)
}

fn geocode(geocoder: &dyn Geocoder, address: &str) -> Located {
    match geocoder.locate(address) {
        Ok(Some(found)) => Located::Found(found.latitude, found.longitude),
        Ok(None) => {
            debug!(address, "no geocoder match");
            Located::Missing("Latitude")
        }
        Err(error) => {
            warn!(address, %error, "geocoding failed");
            Located::Missing("Latitude")
        }
    }
}

impl DatasetNormalizer for MineNormalizer {
    type Output = MineRecord;

    fn normalize(
        &self,
        sources: &DatasetSources,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Normalized<MineRecord>> {
        let table = combined_table(sources)?;
        let resolver = ColumnResolver::new(ctx.schema, &table);
        resolver.require(JOIN_KEY)?;
        resolver.require("Street")?;
        let has_coordinates = resolver.has("Latitude") && resolver.has("Longitude");
        if !has_coordinates && ctx.geocoder.is_none() {
            warn!("mine table has no coordinates and geocoding is disabled");
        }

        let mut out = Normalized::default();
        out.absorb_malformed(&table);
        let mut geocoded = 0usize;
        for row in &table.rows {
            let street = clean_text(resolver.value(row, "Street"));
            if street.is_empty() {
                out.drop_row(&table.source, row.line, DropReason::missing("Street"));
                continue;
            }
            let mine_status = MineStatus::parse(&clean_text(resolver.value(row, "Mine Status")));
            if mine_status.as_ref().is_some_and(MineStatus::is_abandoned) {
                out.drop_row(
                    &table.source,
                    row.line,
                    DropReason::filtered("abandoned mine"),
                );
                continue;
            }
            let mine_id = clean_identifier(resolver.value(row, JOIN_KEY));
            if mine_id.is_empty() {
                out.drop_row(&table.source, row.line, DropReason::missing(JOIN_KEY));
                continue;
            }

            let city = clean_text(resolver.value(row, "City"));
            let state = clean_text(resolver.value(row, "State"));
            let zip_code = normalize_zip(resolver.value(row, "Zip Code"));

            let mut located = if has_coordinates {
                read_coordinates(&resolver, row)
            } else {
                Located::Missing("Latitude")
            };
            if let (Located::Missing(_), Some(geocoder)) = (&located, ctx.geocoder) {
                let address = one_line_address(&street, &city, &state, &zip_code);
                located = geocode(geocoder, &address);
                geocoded += 1;
            }
            let (latitude, longitude) = match located {
                Located::Found(lat, lon) => (lat, lon),
                Located::Missing(column) => {
                    out.drop_row(&table.source, row.line, DropReason::missing(column));
                    continue;
                }
                Located::Invalid(column, value) => {
                    out.drop_row(&table.source, row.line, DropReason::invalid(column, &value));
                    continue;
                }
            };

            out.push(MineRecord {
                mine_id,
                mine_name: clean_text(resolver.value(row, "Mine Name")),
                mine_status,
                mine_type: clean_text(resolver.value(row, "Type of Mine")),
                street,
                city,
                state,
                zip_code,
                latitude,
                longitude,
            });
        }
        if geocoded > 0 {
            debug!(lookups = geocoded, "geocoded mine addresses");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_geocode::{Coordinates, GeocodeError};
    use agg_ingest::SourceTable;
    use std::cell::RefCell;
    use std::path::PathBuf;

    struct StubGeocoder {
        calls: RefCell<Vec<String>>,
    }

    impl Geocoder for StubGeocoder {
        fn locate(&self, address: &str) -> agg_geocode::Result<Option<Coordinates>> {
            self.calls.borrow_mut().push(address.to_string());
            if address.starts_with("1 Quarry") {
                Ok(Some(Coordinates {
                    latitude: 32.4,
                    longitude: -87.0,
                }))
            } else if address.starts_with("9 Offline") {
                Err(GeocodeError::Network("timed out".into()))
            } else {
                Ok(None)
            }
        }
    }

    fn source(name: &str, headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        SourceTable {
            path: PathBuf::from(name),
            year: None,
            table: RawTable {
                source: PathBuf::from(name),
                headers: headers.iter().map(|h| (*h).to_string()).collect(),
                rows: rows
                    .iter()
                    .enumerate()
                    .map(|(idx, cells)| RawRow {
                        line: idx as u64 + 2,
                        cells: cells.iter().map(|c| (*c).to_string()).collect(),
                    })
                    .collect(),
                malformed: Vec::new(),
            },
        }
    }

    fn schema() -> agg_model::DatasetSchema {
        agg_standards::load_default_registry()
            .unwrap()
            .get(DatasetKind::Mine)
            .unwrap()
            .clone()
    }

    fn split_sources() -> DatasetSources {
        DatasetSources {
            kind: DatasetKind::Mine,
            tables: vec![source(
                "mines.csv",
                &["Mine ID", "Mine Name", "Mine Status", "Type of Mine"],
                &[
                    &["0100003", "Brown Sand Pit", "Active", "Surface"],
                    &["0100011", "Old River Pit", "Abandoned and Sealed", "Surface"],
                    &["0100020", "Lost Pit", "Intermittent", "Surface"],
                    &["0100030", "Offline Pit", "Active", "Surface"],
                    &["0100040", "Blank Pit", "Active", "Surface"],
                ],
            )],
            addresses: Some(source(
                "mines-address.csv",
                &["Mine ID", "Mine Name", "Street", "City", "State", "Zip Code"],
                &[
                    &["0100003", "BROWN SAND PIT", "1 Quarry Rd", "Selma", "AL", "36701"],
                    &["0100011", "OLD RIVER PIT", "2 River Rd", "Selma", "AL", "36701"],
                    &["0100020", "LOST PIT", "5 Nowhere Ln", "Selma", "AL", "36701"],
                    &["0100030", "OFFLINE PIT", "9 Offline Rd", "Selma", "AL", "36701"],
                    &["0100040", "BLANK PIT", "", "Selma", "AL", "36701"],
                ],
            )),
        }
    }

    #[test]
    fn geocodes_joined_mines_and_drops_the_rest() {
        let schema = schema();
        let geocoder = StubGeocoder {
            calls: RefCell::new(Vec::new()),
        };
        let ctx = NormalizeContext::new(&schema).with_geocoder(&geocoder);
        let out = MineNormalizer.normalize(&split_sources(), &ctx).unwrap();

        assert_eq!(out.records.len(), 1);
        let mine = &out.records[0];
        assert_eq!(mine.mine_name, "Brown Sand Pit");
        assert_eq!(mine.latitude, 32.4);
        assert_eq!(mine.mine_status, Some(MineStatus::Active));

        let reasons: Vec<String> = out.dropped.iter().map(|d| d.reason.to_string()).collect();
        assert_eq!(
            reasons,
            vec![
                "filtered: abandoned mine",
                "missing required Latitude",
                "missing required Latitude",
                "missing required Street",
            ]
        );
        // Abandoned and address-less mines are never sent to the geocoder.
        assert_eq!(geocoder.calls.borrow().len(), 3);
        assert_eq!(geocoder.calls.borrow()[0], "1 Quarry Rd, Selma, AL 36701");
    }

    #[test]
    fn pre_geocoded_table_needs_no_geocoder() {
        let schema = schema();
        let sources = DatasetSources {
            kind: DatasetKind::Mine,
            tables: Vec::new(),
            addresses: Some(source(
                "mine_addresses_with_coords.csv",
                &["Mine ID", "Mine Name_x", "Mine Status", "Street", "lat", "lon"],
                &[
                    &["0100003", "Brown Sand Pit", "Active", "1 Quarry Rd", "32.4", "-87.0"],
                    &["0100020", "Lost Pit", "Active", "5 Nowhere Ln", "", ""],
                    &["0100021", "Typo Pit", "Active", "6 Nowhere Ln", "north", "-87"],
                ],
            )),
        };
        let out = MineNormalizer
            .normalize(&sources, &NormalizeContext::new(&schema))
            .unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].mine_name, "Brown Sand Pit");
        assert_eq!(out.records[0].longitude, -87.0);
        assert_eq!(out.dropped[0].reason, DropReason::missing("Latitude"));
        assert_eq!(out.dropped[1].reason, DropReason::invalid("Latitude", "north"));
    }

    #[test]
    fn missing_street_column_is_an_error() {
        let schema = schema();
        let sources = DatasetSources {
            kind: DatasetKind::Mine,
            tables: vec![source("mines.csv", &["Mine ID", "Mine Name"], &[])],
            addresses: None,
        };
        let err = MineNormalizer
            .normalize(&sources, &NormalizeContext::new(&schema))
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { column, .. } if column == "Street"));
    }
}
