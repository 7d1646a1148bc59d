use serde::{Deserialize, Serialize};

use crate::dataset::DatasetKind;
use crate::enums::{ColumnType, CoreDesignation};

/// Inclusive temporal coverage of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// One canonical column of a clean table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub label: String,
    pub order: u32,
    pub column_type: ColumnType,
    pub core: CoreDesignation,
    /// Part of the identifier that must be unique per dataset.
    pub key: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Raw header spellings that map onto this column.
    pub aliases: Vec<String>,
}

impl ColumnDef {
    /// Effective lower and upper bounds, combining declared and implied ones.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        let implied = self.column_type.implied_bounds();
        (
            self.min.or(implied.map(|(lo, _)| lo)),
            self.max.or(implied.map(|(_, hi)| hi)),
        )
    }

    /// True when `header` names this column directly or through an alias.
    pub fn matches_header(&self, header: &str) -> bool {
        let needle = header_key(header);
        header_key(&self.name) == needle || self.aliases.iter().any(|a| header_key(a) == needle)
    }
}

/// Case and whitespace insensitive form of a header used for matching.
pub fn header_key(header: &str) -> String {
    header
        .trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// The declared shape of one dataset family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub kind: DatasetKind,
    pub label: String,
    pub source: String,
    pub source_url: Option<String>,
    /// False for schemas inferred from cleaning scripts rather than published
    /// documentation.
    pub documented: bool,
    pub years: Option<YearRange>,
    pub output_name: Option<String>,
    /// Columns sorted by `order`.
    pub columns: Vec<ColumnDef>,
}

impl DatasetSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        let key = header_key(name);
        self.columns.iter().find(|c| header_key(&c.name) == key)
    }

    pub fn key_columns(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.key).collect()
    }

    pub fn required_columns(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.core.is_required()).collect()
    }

    pub fn is_provisional(&self) -> bool {
        !self.documented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, column_type: ColumnType, aliases: &[&str]) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            label: name.to_string(),
            order: 1,
            column_type,
            core: CoreDesignation::Required,
            key: false,
            min: None,
            max: None,
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    #[test]
    fn header_matching_ignores_case_and_spacing() {
        let col = column("Mine Name", ColumnType::Char, &["Mine Name_x"]);
        assert!(col.matches_header(" mine  NAME "));
        assert!(col.matches_header("MINE NAME_X"));
        assert!(!col.matches_header("Mine"));
    }

    #[test]
    fn latitude_bounds_are_implied() {
        let col = column("Latitude", ColumnType::Latitude, &[]);
        assert_eq!(col.bounds(), (Some(-90.0), Some(90.0)));
        let mut quantity = column("Quantity", ColumnType::Num, &[]);
        quantity.min = Some(0.0);
        assert_eq!(quantity.bounds(), (Some(0.0), None));
    }

    #[test]
    fn year_range_is_inclusive() {
        let range = YearRange {
            min: 2010,
            max: 2021,
        };
        assert!(range.contains(2010));
        assert!(range.contains(2021));
        assert!(!range.contains(2022));
    }
}
