//! Loaders for `Datasets.csv`, `Variables.csv` and `States.csv`.

use std::collections::BTreeMap;
use std::path::Path;

use agg_model::{ColumnDef, ColumnType, CoreDesignation, DatasetKind, DatasetSchema, YearRange};

use crate::csv_utils::read_standards_rows;
use crate::error::{Result, StandardsError};

fn parse_kind(path: &Path, value: &str) -> Result<DatasetKind> {
    value
        .parse::<DatasetKind>()
        .map_err(|_| StandardsError::UnknownDataset {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_uppercase().as_str(),
        "Y" | "YES" | "TRUE" | "1"
    )
}

fn parse_optional_number<T: std::str::FromStr>(
    path: &Path,
    field: &str,
    value: Option<&str>,
) -> Result<Option<T>> {
    match value {
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|_| StandardsError::invalid(path, field, text)),
        None => Ok(None),
    }
}

/// Loads dataset level metadata. Columns are left empty.
pub fn load_datasets(path: &Path) -> Result<Vec<DatasetSchema>> {
    let mut schemas = Vec::new();
    for row in read_standards_rows(path)? {
        let kind = parse_kind(path, row.text("Dataset"))?;
        let year_min: Option<i32> =
            parse_optional_number(path, "Year Min", row.optional("Year Min"))?;
        let year_max: Option<i32> =
            parse_optional_number(path, "Year Max", row.optional("Year Max"))?;
        let years = match (year_min, year_max) {
            (Some(min), Some(max)) if min <= max => Some(YearRange { min, max }),
            (None, None) => None,
            _ => {
                return Err(StandardsError::invalid(
                    path,
                    "Year Min/Year Max",
                    format!("{year_min:?}/{year_max:?}"),
                ));
            }
        };
        schemas.push(DatasetSchema {
            kind,
            label: row.text("Label").to_string(),
            source: row.text("Source").to_string(),
            source_url: row.optional("Source URL").map(str::to_string),
            documented: parse_flag(row.text("Documented")),
            years,
            output_name: row.optional("Output Name").map(str::to_string),
            columns: Vec::new(),
        });
    }
    Ok(schemas)
}

/// Loads column definitions grouped by dataset and sorted by order.
pub fn load_variables(path: &Path) -> Result<BTreeMap<DatasetKind, Vec<ColumnDef>>> {
    let mut columns: BTreeMap<DatasetKind, Vec<ColumnDef>> = BTreeMap::new();
    for row in read_standards_rows(path)? {
        let kind = parse_kind(path, row.text("Dataset"))?;
        let name = row.text("Column Name").to_string();
        if name.is_empty() {
            continue;
        }
        let type_text = row.text("Type");
        let column_type = type_text
            .parse::<ColumnType>()
            .map_err(|_| StandardsError::invalid(path, "Type", type_text))?;
        let core_text = row.text("Core");
        let core = core_text
            .parse::<CoreDesignation>()
            .map_err(|_| StandardsError::invalid(path, "Core", core_text))?;
        let order: u32 = parse_optional_number(path, "Order", row.optional("Order"))?
            .unwrap_or(u32::MAX);
        let aliases = row
            .optional("Aliases")
            .map(|text| {
                text.split(';')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        columns.entry(kind).or_default().push(ColumnDef {
            label: row.text("Label").to_string(),
            order,
            column_type,
            core,
            key: parse_flag(row.text("Key")),
            min: parse_optional_number(path, "Min", row.optional("Min"))?,
            max: parse_optional_number(path, "Max", row.optional("Max"))?,
            aliases,
            name,
        });
    }
    for defs in columns.values_mut() {
        defs.sort_by_key(|def| def.order);
    }
    Ok(columns)
}

/// Loads the USPS abbreviation to state name table, keyed by abbreviation.
pub fn load_states(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut states = BTreeMap::new();
    for row in read_standards_rows(path)? {
        let abbrev = row.text("Abbreviation").to_uppercase();
        let name = row.text("Name").to_string();
        if abbrev.is_empty() || name.is_empty() {
            continue;
        }
        states.insert(abbrev, name);
    }
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn rejects_unknown_column_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Variables.csv");
        fs::write(
            &path,
            "Dataset,Order,Column Name,Label,Type,Core,Key,Min,Max,Aliases\n\
             mine,1,Mine ID,Id,Date,Req,Y,,,\n",
        )
        .unwrap();
        let err = load_variables(&path).unwrap_err();
        assert!(matches!(err, StandardsError::InvalidValue { ref field, .. } if field == "Type"));
    }

    #[test]
    fn sorts_columns_by_order_and_splits_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Variables.csv");
        fs::write(
            &path,
            "Dataset,Order,Column Name,Label,Type,Core,Key,Min,Max,Aliases\n\
             mine,2,Latitude,Lat,Latitude,Req,,-90,90,lat; LATITUDE\n\
             mine,1,Mine ID,Id,Char,Req,Y,,,\n",
        )
        .unwrap();
        let columns = load_variables(&path).unwrap();
        let mine = &columns[&DatasetKind::Mine];
        assert_eq!(mine[0].name, "Mine ID");
        assert!(mine[0].key);
        assert_eq!(mine[1].aliases, vec!["lat", "LATITUDE"]);
        assert_eq!(mine[1].min, Some(-90.0));
    }

    #[test]
    fn half_open_year_range_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Datasets.csv");
        fs::write(
            &path,
            "Dataset,Label,Source,Source URL,Documented,Year Min,Year Max,Output Name\n\
             clinker,Cement,EPA,,Y,2010,,\n",
        )
        .unwrap();
        assert!(load_datasets(&path).is_err());
    }
}
