//! Text cleanup for identifiers, names and postal codes.

/// Trims, strips wrapping quotes and collapses inner whitespace.
pub fn clean_text(value: &str) -> String {
    value
        .trim()
        .trim_matches('"')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a US ZIP code.
///
/// A trailing `.0` left by spreadsheet exports is removed and 3 or 4 digit
/// codes that lost their leading zeros are padded back to five digits.
/// ZIP+4 and anything non-numeric is returned cleaned but otherwise as is.
pub fn normalize_zip(value: &str) -> String {
    let cleaned = clean_text(value);
    let base = cleaned.strip_suffix(".0").unwrap_or(&cleaned);
    if base.chars().all(|c| c.is_ascii_digit()) && (3..5).contains(&base.len()) {
        format!("{base:0>5}")
    } else {
        base.to_string()
    }
}

/// Cleans an identifier that may have been exported as a float (`"1000001.0"`).
pub fn clean_identifier(value: &str) -> String {
    let cleaned = clean_text(value);
    match cleaned.strip_suffix(".0") {
        Some(base) if !base.is_empty() && base.chars().all(|c| c.is_ascii_digit()) => {
            base.to_string()
        }
        _ => cleaned,
    }
}
