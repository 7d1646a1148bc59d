//! Error types for geocoding.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeocodeError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("invalid geocoder endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    /// Transport failure or non-success status.
    #[error("network error: {0}")]
    Network(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Every attempt failed; carries the last error.
    #[error("geocoding '{address}' failed after {attempts} attempts: {last}")]
    Exhausted {
        address: String,
        attempts: u32,
        last: Box<GeocodeError>,
    },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeocodeError>;
