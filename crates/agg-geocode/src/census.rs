//! US Census Bureau geocoder client.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use agg_model::GeocodeOptions;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::error::{GeocodeError, Result};
use crate::{Coordinates, Geocoder};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("aggstock/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct CensusResponse {
    #[serde(default)]
    result: Option<CensusResult>,
}

#[derive(Debug, Deserialize)]
struct CensusResult {
    #[serde(rename = "addressMatches", default)]
    address_matches: Vec<AddressMatch>,
}

#[derive(Debug, Deserialize)]
struct AddressMatch {
    coordinates: CensusCoordinates,
}

/// The service reports longitude as `x` and latitude as `y`.
#[derive(Debug, Deserialize)]
struct CensusCoordinates {
    x: f64,
    y: f64,
}

/// Extracts the first address match from a geocoder response body.
pub fn parse_census_response(body: &str) -> Result<Option<Coordinates>> {
    let response: CensusResponse = serde_json::from_str(body)?;
    let first = response
        .result
        .and_then(|result| result.address_matches.into_iter().next());
    Ok(first.map(|m| Coordinates {
        latitude: m.coordinates.y,
        longitude: m.coordinates.x,
    }))
}

/// Blocking client for the one-line address endpoint.
///
/// Calls are spaced at least `pause` apart; failed calls are retried
/// `retries` times in total with `retry_delay` between attempts.
#[derive(Debug)]
pub struct CensusGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    benchmark: String,
    retries: u32,
    retry_delay: Duration,
    pause: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CensusGeocoder {
    pub fn new(options: &GeocodeOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        Url::parse(&options.endpoint).map_err(|e| GeocodeError::InvalidEndpoint {
            url: options.endpoint.clone(),
            message: e.to_string(),
        })?;

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| GeocodeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: options.endpoint.clone(),
            benchmark: options.benchmark.clone(),
            retries: options.retries.max(1),
            retry_delay: Duration::from_millis(options.retry_delay_ms),
            pause: Duration::from_millis(options.pause_ms),
            last_call: Mutex::new(None),
        })
    }

    fn request_url(&self, address: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("address", address),
                ("benchmark", self.benchmark.as_str()),
                ("format", "json"),
            ],
        )
        .map_err(|e| GeocodeError::InvalidEndpoint {
            url: self.endpoint.clone(),
            message: e.to_string(),
        })
    }

    fn wait_for_slot(&self) {
        let Ok(mut last) = self.last_call.lock() else {
            return;
        };
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.pause {
                std::thread::sleep(self.pause - elapsed);
            }
        }
        *last = Some(Instant::now());
    }

    fn attempt(&self, url: &Url) -> Result<Option<Coordinates>> {
        self.wait_for_slot();
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Network(format!(
                "census geocoder returned {status}"
            )));
        }
        let body = response.text()?;
        parse_census_response(&body)
    }
}

impl Geocoder for CensusGeocoder {
    fn locate(&self, address: &str) -> Result<Option<Coordinates>> {
        let url = self.request_url(address)?;
        let mut last_error = None;
        for attempt in 1..=self.retries {
            match self.attempt(&url) {
                Ok(found) => {
                    tracing::trace!(address, attempt, matched = found.is_some(), "geocoded");
                    return Ok(found);
                }
                Err(error) => {
                    tracing::debug!(address, attempt, %error, "geocoder attempt failed");
                    last_error = Some(error);
                    if attempt < self.retries {
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        Err(GeocodeError::Exhausted {
            address: address.to_string(),
            attempts: self.retries,
            last: Box::new(
                last_error.unwrap_or_else(|| GeocodeError::Network("no attempt made".into())),
            ),
        })
    }
}
