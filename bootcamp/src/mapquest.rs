//! MapQuest geocoding provider.
//!
//! Only available when the `mapquest` feature is enabled.
//!
//! ```ignore
//! use bootcamp::mapquest::{MapQuestConfig, MapQuestGeocoder};
//!
//! let geocoder = MapQuestGeocoder::new(MapQuestConfig::new("my-api-key"))?;
//! let results = geocoder.geocode("02118").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{BootcampError, Result};
use crate::geocoder::{GeocodeResult, Geocoder};

/// MapQuest Geocoding API v1 address endpoint.
pub const MAPQUEST_ENDPOINT: &str = "https://www.mapquestapi.com/geocoding/v1/address";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum candidates requested per lookup.
const MAX_RESULTS: &str = "5";

/// Configuration for the MapQuest provider.
#[derive(Debug, Clone)]
pub struct MapQuestConfig {
    /// MapQuest consumer key.
    pub api_key: String,
    /// Endpoint URL; overridable for proxies and tests.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl MapQuestConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: MAPQUEST_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Geocoder backed by the MapQuest Geocoding API.
pub struct MapQuestGeocoder {
    client: Client,
    config: MapQuestConfig,
}

impl MapQuestGeocoder {
    /// Create a new provider with the given configuration.
    pub fn new(config: MapQuestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BootcampError::Geocoder {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("location", query),
                ("maxResults", MAX_RESULTS),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BootcampError::Geocoder {
                reason: e.without_url().to_string(),
            })?;

        let body: MapQuestResponse = response.json().await.map_err(|e| BootcampError::Geocoder {
            reason: format!("Unexpected response: {}", e.without_url()),
        })?;

        parse_response(body)
    }
}

#[derive(Debug, Deserialize)]
struct MapQuestResponse {
    info: MapQuestInfo,
    #[serde(default)]
    results: Vec<MapQuestResult>,
}

#[derive(Debug, Deserialize)]
struct MapQuestInfo {
    statuscode: i64,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MapQuestResult {
    #[serde(default)]
    locations: Vec<MapQuestLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapQuestLocation {
    lat_lng: LatLng,
    #[serde(default)]
    street: Option<String>,
    /// City.
    #[serde(default)]
    admin_area5: Option<String>,
    /// State.
    #[serde(default)]
    admin_area3: Option<String>,
    /// Country.
    #[serde(default)]
    admin_area1: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_response(body: MapQuestResponse) -> Result<Vec<GeocodeResult>> {
    if body.info.statuscode != 0 {
        return Err(BootcampError::Geocoder {
            reason: format!(
                "MapQuest status {}: {}",
                body.info.statuscode,
                body.info.messages.join("; ")
            ),
        });
    }

    Ok(body
        .results
        .into_iter()
        .flat_map(|r| r.locations)
        .map(|loc| {
            let street = non_empty(loc.street);
            let city = non_empty(loc.admin_area5);
            let state_code = non_empty(loc.admin_area3);
            let zipcode = non_empty(loc.postal_code);
            let country_code = non_empty(loc.admin_area1);

            let parts: Vec<&str> = [&street, &city, &state_code, &zipcode, &country_code]
                .into_iter()
                .filter_map(|p| p.as_deref())
                .collect();
            let formatted_address = (!parts.is_empty()).then(|| parts.join(", "));

            GeocodeResult {
                latitude: loc.lat_lng.lat,
                longitude: loc.lat_lng.lng,
                formatted_address,
                street,
                city,
                state_code,
                zipcode,
                country_code,
            }
        })
        .collect())
}
