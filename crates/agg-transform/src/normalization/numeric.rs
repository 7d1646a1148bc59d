//! Numeric coercion for raw source cells.
//!
//! USGS, EPA and Census tables format numbers for people: thousands
//! separators, dollar signs, padding, non-breaking spaces and suppression
//! markers. Everything here is lenient on formatting and strict on meaning.

use agg_common::parse_f64;

/// Markers agencies use in place of withheld or unavailable values.
const SUPPRESSION_MARKERS: &[&str] = &["W", "--", "NA", "(D)", "X"];

/// True when `value` is a suppression marker such as `W` (withheld).
pub fn is_suppressed(value: &str) -> bool {
    let trimmed = value.trim();
    SUPPRESSION_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Parse a formatted number to `f64`.
///
/// Handles:
/// - Thousands separators: "1,234,567"
/// - Currency: "$12,500"
/// - Whitespace and non-breaking spaces: " 1 234 "
///
/// Returns None for empty cells, suppression markers, non-finite values and
/// anything else that is not a number.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_suppressed(trimmed) {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' ' | '\u{a0}'))
        .collect();
    parse_f64(&cleaned)
}

/// Parse a whole count; `"19,101"` and `"2014.0"` are accepted.
pub fn parse_count(value: &str) -> Option<i64> {
    let number = parse_numeric(value)?;
    if number.fract() != 0.0 || number.abs() > i64::MAX as f64 {
        return None;
    }
    Some(number as i64)
}

/// Parse a calendar year in 1000-9999.
pub fn parse_year(value: &str) -> Option<i32> {
    let year = parse_count(value)?;
    if (1000..=9999).contains(&year) {
        i32::try_from(year).ok()
    } else {
        None
    }
}

/// Parse a decimal-degree coordinate. Bounds are checked by the validator.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    parse_numeric(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_separators_and_currency() {
        assert_eq!(parse_numeric("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_numeric("$12,500.50"), Some(12_500.5));
        assert_eq!(parse_numeric("\u{a0}960 000 "), Some(960_000.0));
        assert_eq!(parse_numeric("-45.67"), Some(-45.67));
    }

    #[test]
    fn suppressed_and_empty_are_none() {
        for value in ["", "  ", "W", "w", "--", "NA", "(D)", "X"] {
            assert_eq!(parse_numeric(value), None, "{value:?}");
        }
        assert!(is_suppressed(" W "));
        assert!(!is_suppressed("0"));
    }

    #[test]
    fn rejects_text_and_non_finite() {
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("12.34.56"), None);
        assert_eq!(parse_numeric("nan"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn counts_must_be_whole() {
        assert_eq!(parse_count("19,101"), Some(19_101));
        assert_eq!(parse_count("2014.0"), Some(2014));
        assert_eq!(parse_count("2.5"), None);
    }

    #[test]
    fn years() {
        assert_eq!(parse_year("1902"), Some(1902));
        assert_eq!(parse_year(" 2022.0 "), Some(2022));
        assert_eq!(parse_year("22"), None);
        assert_eq!(parse_year("Total"), None);
    }

    proptest! {
        #[test]
        fn formatted_integers_round_trip(n in 0i64..1_000_000_000) {
            let mut grouped = String::new();
            let digits = n.to_string();
            for (idx, ch) in digits.chars().enumerate() {
                if idx > 0 && (digits.len() - idx) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            prop_assert_eq!(parse_count(&grouped), Some(n));
            prop_assert_eq!(parse_numeric(&format!("${grouped}")), Some(n as f64));
        }

        #[test]
        fn coordinates_parse_any_finite_decimal(v in -180.0f64..180.0) {
            let text = format!("{v}");
            prop_assert_eq!(parse_coordinate(&text), Some(v));
        }
    }
}
