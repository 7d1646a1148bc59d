//! Year extraction from source file names.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static YEAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("valid year regex"));

/// Returns the first plausible four digit year (1900-2099) in the file stem.
///
/// `cement_production_2014-02_11_2026.csv` yields 2014 and the Census permit
/// file `stateannual_202299.csv` yields 2022.
pub fn extract_year(path: &Path) -> Option<i32> {
    let stem = path.file_stem()?.to_str()?;
    YEAR_RUN
        .find_iter(stem)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| (1900..=2099).contains(year))
}
