//! Address to coordinate lookup.
//!
//! The [`Geocoder`] trait is the seam the mine normalizer depends on;
//! [`CensusGeocoder`] implements it against the US Census Bureau one-line
//! address endpoint.

mod census;
mod error;

pub use census::{CensusGeocoder, parse_census_response};
pub use error::{GeocodeError, Result};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves a one-line postal address to coordinates.
///
/// `Ok(None)` means the service answered but found no match.
pub trait Geocoder {
    fn locate(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// Formats an address the way the Census endpoint expects:
/// `"street, city, ST zip"`.
///
/// Empty parts are left out so that a missing ZIP does not leave a
/// trailing space.
pub fn one_line_address(street: &str, city: &str, state: &str, zip: &str) -> String {
    let tail = [state.trim(), zip.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    [street.trim(), city.trim(), tail.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_address() {
        assert_eq!(
            one_line_address("1 Quarry Rd", "Selma", "AL", "36701"),
            "1 Quarry Rd, Selma, AL 36701"
        );
    }

    #[test]
    fn skips_missing_parts() {
        assert_eq!(one_line_address("1 Quarry Rd", "", "AL", ""), "1 Quarry Rd, AL");
    }
}
