//! Postal-code and address geocoding.
//!
//! [`Geocoder`] is the interface the service depends on. Two providers ship
//! with the crate:
//!
//! - [`StaticGeocoder`]: a fixed table of answers, loaded from a JSON file or
//!   built in code. Used for tests and offline deployments.
//! - [`MapQuestGeocoder`](crate::mapquest::MapQuestGeocoder): the MapQuest
//!   Geocoding API (requires the `mapquest` feature).
//!
//! Wrap either in [`CachedGeocoder`](crate::cache::CachedGeocoder) to avoid
//! repeated lookups.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One candidate location returned by a geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl GeocodeResult {
    /// A result carrying only coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            formatted_address: None,
            street: None,
            city: None,
            state_code: None,
            zipcode: None,
            country_code: None,
        }
    }

    /// `[longitude, latitude]`, the order spatial queries expect.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Resolve free text (a postal code or an address) to locations.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up `query`. No match is an empty vector, not an error.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>>;
}

/// Normalise a query for use as a lookup key.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// A geocoder answering from a fixed table.
///
/// Keys are matched after [`normalize_query`], so `" 02118 "` finds `"02118"`.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, Vec<GeocodeResult>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer for `query`. Repeated calls append further candidates.
    pub fn with_entry(mut self, query: &str, result: GeocodeResult) -> Self {
        self.entries
            .entry(normalize_query(query))
            .or_default()
            .push(result);
        self
    }

    /// Load a table from a JSON object mapping queries to a result or a list
    /// of results:
    ///
    /// ```json
    /// {
    ///   "02118": { "latitude": 42.3425, "longitude": -71.0723 },
    ///   "01002": [{ "latitude": 42.3732, "longitude": -72.5199 }]
    /// }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            One(GeocodeResult),
            Many(Vec<GeocodeResult>),
        }

        let contents = std::fs::read_to_string(path.as_ref())?;
        let raw: HashMap<String, Entry> = serde_json::from_str(&contents)?;
        let entries = raw
            .into_iter()
            .map(|(query, entry)| {
                let results = match entry {
                    Entry::One(result) => vec![result],
                    Entry::Many(results) => results,
                };
                (normalize_query(&query), results)
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        Ok(self
            .entries
            .get(&normalize_query(query))
            .cloned()
            .unwrap_or_default())
    }
}
