//! Validation issue types.
//!
//! Each [`Issue`] variant carries only the data its message needs. Severity
//! and category are derived from the variant.

use serde::{Deserialize, Serialize};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Affected rows are removed from the clean table.
    Reject,
    /// The table is exported but must be reviewed.
    Error,
    /// Informational.
    Warning,
}

impl Severity {
    /// Parse severity from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reject => "Reject",
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Check family an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Structure,
    Presence,
    Format,
    Range,
    Consistency,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Presence => "Presence",
            Self::Format => "Format",
            Self::Range => "Range",
            Self::Consistency => "Consistency",
        }
    }
}

/// Validation issue - each variant carries only its needed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Issue {
    // Structure checks
    /// Column set differs from the declared schema
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        provisional: bool,
    },

    // Presence checks
    /// Required column is absent from the table
    RequiredMissing { variable: String },
    /// Required column exists but has empty values
    RequiredEmpty { variable: String, null_count: u64 },

    // Format checks
    /// Numeric column contains values that are not numbers
    DataTypeMismatch {
        variable: String,
        non_numeric_count: u64,
        samples: Vec<String>,
    },

    // Range checks
    /// Latitude or longitude outside WGS84 bounds
    CoordinateOutOfRange {
        variable: String,
        out_of_range_count: u64,
        min: f64,
        max: f64,
        samples: Vec<String>,
    },
    /// Year outside the dataset's coverage
    YearOutOfRange {
        variable: String,
        out_of_range_count: u64,
        min: i32,
        max: i32,
        samples: Vec<String>,
    },
    /// Value outside declared min/max bounds
    ValueOutOfRange {
        variable: String,
        out_of_range_count: u64,
        min: Option<f64>,
        max: Option<f64>,
        samples: Vec<String>,
    },

    // Consistency checks
    /// Identifier columns repeat across rows
    DuplicateKey {
        variable: String,
        duplicate_count: u64,
        samples: Vec<String>,
    },
    /// Reported apparent consumption differs from production + imports - exports
    BalanceMismatch {
        variable: String,
        mismatch_count: u64,
        tolerance: f64,
        samples: Vec<String>,
    },
}

fn sample_suffix(samples: &[String]) -> String {
    if samples.is_empty() {
        String::new()
    } else {
        format!(" (e.g., {})", samples.join(", "))
    }
}

fn bound_label(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
        (Some(lo), None) => format!(">= {lo}"),
        (None, Some(hi)) => format!("<= {hi}"),
        (None, None) => "unbounded".to_string(),
    }
}

impl Issue {
    pub fn rule_id(&self) -> &'static str {
        match self {
            Issue::SchemaMismatch { .. } => "AGG001",
            Issue::RequiredMissing { .. } => "AGG002",
            Issue::RequiredEmpty { .. } => "AGG003",
            Issue::DataTypeMismatch { .. } => "AGG004",
            Issue::CoordinateOutOfRange { .. } => "AGG005",
            Issue::YearOutOfRange { .. } => "AGG006",
            Issue::ValueOutOfRange { .. } => "AGG007",
            Issue::DuplicateKey { .. } => "AGG008",
            Issue::BalanceMismatch { .. } => "AGG009",
        }
    }

    /// Column the issue is about. Table-level issues have none.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Issue::SchemaMismatch { .. } => None,
            Issue::RequiredMissing { variable }
            | Issue::RequiredEmpty { variable, .. }
            | Issue::DataTypeMismatch { variable, .. }
            | Issue::CoordinateOutOfRange { variable, .. }
            | Issue::YearOutOfRange { variable, .. }
            | Issue::ValueOutOfRange { variable, .. }
            | Issue::DuplicateKey { variable, .. }
            | Issue::BalanceMismatch { variable, .. } => Some(variable),
        }
    }

    /// Count of occurrences (if applicable).
    pub fn count(&self) -> Option<u64> {
        match self {
            Issue::SchemaMismatch {
                missing,
                unexpected,
                ..
            } => Some((missing.len() + unexpected.len()) as u64),
            Issue::RequiredMissing { .. } => None,
            Issue::RequiredEmpty { null_count, .. } => Some(*null_count),
            Issue::DataTypeMismatch {
                non_numeric_count, ..
            } => Some(*non_numeric_count),
            Issue::CoordinateOutOfRange {
                out_of_range_count,
                ..
            }
            | Issue::YearOutOfRange {
                out_of_range_count,
                ..
            }
            | Issue::ValueOutOfRange {
                out_of_range_count,
                ..
            } => Some(*out_of_range_count),
            Issue::DuplicateKey {
                duplicate_count, ..
            } => Some(*duplicate_count),
            Issue::BalanceMismatch { mismatch_count, .. } => Some(*mismatch_count),
        }
    }

    pub fn samples(&self) -> &[String] {
        match self {
            Issue::DataTypeMismatch { samples, .. }
            | Issue::CoordinateOutOfRange { samples, .. }
            | Issue::YearOutOfRange { samples, .. }
            | Issue::ValueOutOfRange { samples, .. }
            | Issue::DuplicateKey { samples, .. }
            | Issue::BalanceMismatch { samples, .. } => samples,
            _ => &[],
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Issue::SchemaMismatch { .. } => Category::Structure,
            Issue::RequiredMissing { .. } | Issue::RequiredEmpty { .. } => Category::Presence,
            Issue::DataTypeMismatch { .. } => Category::Format,
            Issue::CoordinateOutOfRange { .. }
            | Issue::YearOutOfRange { .. }
            | Issue::ValueOutOfRange { .. } => Category::Range,
            Issue::DuplicateKey { .. } | Issue::BalanceMismatch { .. } => Category::Consistency,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Issue::SchemaMismatch {
                provisional: true, ..
            } => Severity::Warning,
            Issue::SchemaMismatch { .. } => Severity::Error,
            Issue::RequiredMissing { .. }
            | Issue::RequiredEmpty { .. }
            | Issue::CoordinateOutOfRange { .. }
            | Issue::YearOutOfRange { .. }
            | Issue::ValueOutOfRange { .. } => Severity::Reject,
            Issue::DataTypeMismatch { .. } | Issue::DuplicateKey { .. } => Severity::Error,
            Issue::BalanceMismatch { .. } => Severity::Warning,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::SchemaMismatch {
                missing,
                unexpected,
                ..
            } => {
                let mut parts = Vec::new();
                if !missing.is_empty() {
                    parts.push(format!("missing {}", missing.join(", ")));
                }
                if !unexpected.is_empty() {
                    parts.push(format!("unexpected {}", unexpected.join(", ")));
                }
                format!("Column set differs from schema: {}", parts.join("; "))
            }
            Issue::RequiredMissing { variable } => {
                format!("Required column {variable} is missing")
            }
            Issue::RequiredEmpty {
                variable,
                null_count,
            } => format!("Required column {variable} has {null_count} empty values"),
            Issue::DataTypeMismatch {
                variable,
                non_numeric_count,
                samples,
            } => format!(
                "Column {variable} has {non_numeric_count} non-numeric values{}",
                sample_suffix(samples)
            ),
            Issue::CoordinateOutOfRange {
                variable,
                out_of_range_count,
                min,
                max,
                samples,
            } => format!(
                "Column {variable} has {out_of_range_count} coordinates outside [{min}, {max}]{}",
                sample_suffix(samples)
            ),
            Issue::YearOutOfRange {
                variable,
                out_of_range_count,
                min,
                max,
                samples,
            } => format!(
                "Column {variable} has {out_of_range_count} years outside {min}-{max}{}",
                sample_suffix(samples)
            ),
            Issue::ValueOutOfRange {
                variable,
                out_of_range_count,
                min,
                max,
                samples,
            } => format!(
                "Column {variable} has {out_of_range_count} values outside {}{}",
                bound_label(*min, *max),
                sample_suffix(samples)
            ),
            Issue::DuplicateKey {
                variable,
                duplicate_count,
                samples,
            } => format!(
                "Key {variable} has {duplicate_count} duplicate rows{}",
                sample_suffix(samples)
            ),
            Issue::BalanceMismatch {
                variable,
                mismatch_count,
                tolerance,
                samples,
            } => format!(
                "{variable} differs from production + imports - exports by more than {}% in {mismatch_count} rows{}",
                tolerance * 100.0,
                sample_suffix(samples)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_schema_mismatch_is_a_warning() {
        let issue = Issue::SchemaMismatch {
            missing: vec!["total".to_string()],
            unexpected: vec![],
            provisional: true,
        };
        assert_eq!(issue.default_severity(), Severity::Warning);
        assert_eq!(issue.variable(), None);
        assert_eq!(issue.message(), "Column set differs from schema: missing total");
    }

    #[test]
    fn range_messages_include_samples() {
        let issue = Issue::ValueOutOfRange {
            variable: "Quantity".to_string(),
            out_of_range_count: 2,
            min: Some(0.0),
            max: None,
            samples: vec!["-1".to_string(), "-5".to_string()],
        };
        assert_eq!(issue.category(), Category::Range);
        assert_eq!(
            issue.message(),
            "Column Quantity has 2 values outside >= 0 (e.g., -1, -5)"
        );
    }

    #[test]
    fn severity_parse_and_order() {
        assert_eq!(Severity::parse(" WARNING "), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
        assert!(Severity::Reject < Severity::Warning);
    }
}
