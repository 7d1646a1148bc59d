//! Terminal progress for geocoder lookups.

use std::io::{self, IsTerminal};
use std::time::Duration;

use agg_geocode::{Coordinates, Geocoder, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Wraps a geocoder and ticks a spinner for every lookup.
pub struct ProgressGeocoder<G> {
    inner: G,
    bar: ProgressBar,
}

impl<G: Geocoder> ProgressGeocoder<G> {
    /// The spinner is hidden when stderr is not a terminal or `quiet` is set.
    pub fn new(inner: G, quiet: bool) -> Self {
        let bar = if quiet || !io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} geocoded {pos} addresses {wide_msg:.dim}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        Self { inner, bar }
    }

    /// Clears the spinner and returns the number of lookups made.
    pub fn finish(&self) -> u64 {
        self.bar.finish_and_clear();
        self.bar.position()
    }
}

impl<G: Geocoder> Geocoder for ProgressGeocoder<G> {
    fn locate(&self, address: &str) -> Result<Option<Coordinates>> {
        self.bar.set_message(address.to_string());
        let found = self.inner.locate(address);
        self.bar.inc(1);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Geocoder for Fixed {
        fn locate(&self, _address: &str) -> Result<Option<Coordinates>> {
            Ok(Some(Coordinates {
                latitude: 32.4,
                longitude: -87.0,
            }))
        }
    }

    #[test]
    fn counts_lookups() {
        let geocoder = ProgressGeocoder::new(Fixed, true);
        assert!(geocoder.locate("1 Quarry Rd, Selma, AL").unwrap().is_some());
        assert!(geocoder.locate("2 Quarry Rd, Selma, AL").unwrap().is_some());
        assert_eq!(geocoder.finish(), 2);
    }
}
