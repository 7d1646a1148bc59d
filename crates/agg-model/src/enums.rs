//! Enumerations for registry metadata and categorical record fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared type of a canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Free text.
    Char,
    /// Floating point quantity.
    Num,
    /// Whole count.
    Int,
    /// Four digit calendar year.
    Year,
    /// WGS84 latitude, -90..=90.
    Latitude,
    /// WGS84 longitude, -180..=180.
    Longitude,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Char => "Char",
            ColumnType::Num => "Num",
            ColumnType::Int => "Int",
            ColumnType::Year => "Year",
            ColumnType::Latitude => "Latitude",
            ColumnType::Longitude => "Longitude",
        }
    }

    /// True for every type stored as a number in the clean table.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnType::Char)
    }

    /// Geographic bounds implied by the type.
    pub fn implied_bounds(&self) -> Option<(f64, f64)> {
        match self {
            ColumnType::Latitude => Some((-90.0, 90.0)),
            ColumnType::Longitude => Some((-180.0, 180.0)),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "char" | "text" => Ok(ColumnType::Char),
            "num" | "float" => Ok(ColumnType::Num),
            "int" | "integer" => Ok(ColumnType::Int),
            "year" => Ok(ColumnType::Year),
            "latitude" | "lat" => Ok(ColumnType::Latitude),
            "longitude" | "lon" => Ok(ColumnType::Longitude),
            _ => Err(format!("Unknown column type: {s}")),
        }
    }
}

/// Whether a column must be present and populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreDesignation {
    /// Required: rows with no value are rejected.
    Required,
    /// Expected: column present, values may be empty.
    Expected,
    /// Permissible: column present, values often empty.
    Permissible,
}

impl CoreDesignation {
    pub fn as_code(&self) -> &'static str {
        match self {
            CoreDesignation::Required => "Req",
            CoreDesignation::Expected => "Exp",
            CoreDesignation::Permissible => "Perm",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, CoreDesignation::Required)
    }
}

impl fmt::Display for CoreDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for CoreDesignation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "req" | "required" => Ok(CoreDesignation::Required),
            "exp" | "expected" => Ok(CoreDesignation::Expected),
            "perm" | "permissible" => Ok(CoreDesignation::Permissible),
            _ => Err(format!("Unknown core designation: {s}")),
        }
    }
}

/// MSHA current mine status.
///
/// Unknown labels are kept verbatim in `Other` so that no status seen in a
/// source refresh is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineStatus {
    Active,
    Intermittent,
    NewMine,
    NonProducing,
    TemporarilyIdled,
    Abandoned,
    AbandonedSealed,
    Other(String),
}

impl MineStatus {
    /// Parses an MSHA status label. Empty input yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key: String = trimmed
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase();
        let status = match key.as_str() {
            "active" => MineStatus::Active,
            "intermittent" => MineStatus::Intermittent,
            "newmine" => MineStatus::NewMine,
            "nonproducing" => MineStatus::NonProducing,
            "temporarilyidled" => MineStatus::TemporarilyIdled,
            "abandoned" => MineStatus::Abandoned,
            "abandonedandsealed" | "abandonedsealed" => MineStatus::AbandonedSealed,
            _ => MineStatus::Other(trimmed.to_string()),
        };
        Some(status)
    }

    /// Any status that mentions abandonment, including unrecognised ones.
    pub fn is_abandoned(&self) -> bool {
        match self {
            MineStatus::Abandoned | MineStatus::AbandonedSealed => true,
            MineStatus::Other(label) => label.to_lowercase().contains("abandoned"),
            _ => false,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MineStatus::Active => "Active",
            MineStatus::Intermittent => "Intermittent",
            MineStatus::NewMine => "New Mine",
            MineStatus::NonProducing => "NonProducing",
            MineStatus::TemporarilyIdled => "Temporarily Idled",
            MineStatus::Abandoned => "Abandoned",
            MineStatus::AbandonedSealed => "Abandoned and Sealed",
            MineStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for MineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_from_str() {
        assert_eq!("Num".parse::<ColumnType>().unwrap(), ColumnType::Num);
        assert_eq!("latitude".parse::<ColumnType>().unwrap(), ColumnType::Latitude);
        assert!("Date".parse::<ColumnType>().is_err());
    }

    #[test]
    fn core_designation_from_str() {
        assert!("Req".parse::<CoreDesignation>().unwrap().is_required());
        assert!(!"Perm".parse::<CoreDesignation>().unwrap().is_required());
    }

    #[test]
    fn mine_status_labels() {
        assert_eq!(MineStatus::parse("Active"), Some(MineStatus::Active));
        assert_eq!(
            MineStatus::parse("Temporarily Idled"),
            Some(MineStatus::TemporarilyIdled)
        );
        assert_eq!(
            MineStatus::parse("Abandoned and Sealed"),
            Some(MineStatus::AbandonedSealed)
        );
        assert_eq!(MineStatus::parse("  "), None);
    }

    #[test]
    fn abandonment_matches_case_insensitively() {
        assert!(MineStatus::parse("ABANDONED").unwrap().is_abandoned());
        assert!(MineStatus::Other("Partially abandoned".into()).is_abandoned());
        assert!(!MineStatus::Intermittent.is_abandoned());
    }
}
