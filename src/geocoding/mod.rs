//! Address to coordinate resolution backed by the Google Geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::GeocodingConfig;

/// A latitude/longitude pair as stored on a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Could not find location for the specified address.")]
    NotFound,

    #[error("Geocoding provider error: {0}")]
    Upstream(String),

    #[error("Geocoding API key is not configured")]
    MissingApiKey,

    #[error("Invalid geocoding endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl GeocodeResponse {
    /// First result wins; `ZERO_RESULTS` or an empty list means the address
    /// is unknown, any other non-OK status is a provider failure.
    pub(crate) fn into_coordinates(self) -> Result<Coordinates, GeocodeError> {
        match self.status.as_str() {
            "OK" => self
                .results
                .into_iter()
                .next()
                .map(|result| result.geometry.location)
                .ok_or(GeocodeError::NotFound),
            "ZERO_RESULTS" => Err(GeocodeError::NotFound),
            other => Err(GeocodeError::Upstream(match self.error_message {
                Some(message) => format!("{}: {}", other, message),
                None => other.to_string(),
            })),
        }
    }
}

pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        if config.api_key.is_empty() {
            return Err(GeocodeError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(&config.endpoint)?,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let res = self
            .client
            .get(self.endpoint.clone())
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeocodeError::Upstream(format!("HTTP {}", status)));
        }

        let data: GeocodeResponse = res.json().await?;
        data.into_coordinates()
    }
}
