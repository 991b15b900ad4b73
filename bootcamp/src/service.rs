//! The bootcamp service: store and geocoder behind one handle.
//!
//! [`BootcampService`] implements every operation of the API (listing with
//! query translation, CRUD, radius search, seeding). HTTP handlers and the CLI
//! are thin layers over it. Build one with [`BootcampServiceBuilder`]:
//!
//! ```ignore
//! use bootcamp::{BootcampServiceBuilder, ListQuery};
//!
//! let service = BootcampServiceBuilder::new()
//!     .data_file("/data/bootcamps.json")
//!     .geocoder_cache_size(500)
//!     .build()?;
//!
//! let page = service.list(&ListQuery::parse("averageCost[lte]=10000&sort=name")).await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::cache::{CacheStats, CachedGeocoder, DEFAULT_CACHE_SIZE};
use crate::error::{BootcampError, Result};
use crate::geo::miles_to_radians;
use crate::geocoder::{Geocoder, StaticGeocoder};
use crate::model::{unwrap_envelope, Bootcamp, BootcampInput};
use crate::query::{Filter, FindQuery, ListQuery, Pagination};
use crate::store::{BootcampStore, MemoryStore};

#[cfg(feature = "mapquest")]
use crate::mapquest::{MapQuestConfig, MapQuestGeocoder};

/// Field holding each bootcamp's GeoJSON point.
pub const LOCATION_FIELD: &str = "location";

/// One page of listing results.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// Documents after projection.
    pub data: Vec<Value>,
    /// Number of documents matching the filter, across all pages.
    pub total: u64,
    pub pagination: Pagination,
}

/// Store and geocoder handles shared by every request.
///
/// Cloning is cheap; clones share the same store and cache.
#[derive(Clone)]
pub struct BootcampService {
    store: Arc<dyn BootcampStore>,
    geocoder: Arc<CachedGeocoder>,
}

impl BootcampService {
    /// Create a service from explicit parts, caching geocoder answers.
    pub fn new(store: Arc<dyn BootcampStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder: Arc::new(CachedGeocoder::new(geocoder, DEFAULT_CACHE_SIZE)),
        }
    }

    /// Create a builder for more configuration options.
    pub fn builder() -> BootcampServiceBuilder {
        BootcampServiceBuilder::new()
    }

    /// Run a translated listing query.
    ///
    /// `total` (and therefore the `next` link) counts documents matching the
    /// filter, not the whole collection.
    pub async fn list(&self, query: &ListQuery) -> Result<ListPage> {
        let total = self.store.count(&query.filter).await?;
        let bootcamps = self.store.find(&query.find_query()).await?;

        let data = bootcamps
            .iter()
            .map(|b| Ok(query.projection.apply(&b.to_document()?)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            total = total,
            returned = data.len(),
            page = query.page.page,
            "Listed bootcamps"
        );

        Ok(ListPage {
            data,
            total,
            pagination: query.page.pagination(total),
        })
    }

    /// Fetch one bootcamp.
    pub async fn get(&self, id: &str) -> Result<Bootcamp> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Validate and insert a client payload (bare or `{"bootcamp": ...}`).
    pub async fn create(&self, payload: Value) -> Result<Bootcamp> {
        let bootcamp = new_bootcamp(payload)?;
        let created = self.store.create(bootcamp).await?;
        tracing::info!(id = %created.id, name = %created.name, "Bootcamp created");
        Ok(created)
    }

    /// Merge a partial update into a stored bootcamp.
    pub async fn update(&self, id: &str, payload: Value) -> Result<Bootcamp> {
        let Value::Object(patch) = unwrap_envelope(payload) else {
            return Err(BootcampError::validation(
                "Request body must be a JSON object",
            ));
        };
        let updated = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(id = %updated.id, fields = patch.len(), "Bootcamp updated");
        Ok(updated)
    }

    /// Remove a bootcamp, returning the removed document.
    pub async fn delete(&self, id: &str) -> Result<Bootcamp> {
        let deleted = self.store.delete(id).await?.ok_or_else(|| not_found(id))?;
        tracing::info!(id = %deleted.id, "Bootcamp deleted");
        Ok(deleted)
    }

    /// All bootcamps within `distance` miles of the postal code's location.
    ///
    /// The distance is turned into an angular radius (`distance / 3963`) and
    /// matched against each stored `[longitude, latitude]` point.
    pub async fn within_radius(&self, zipcode: &str, distance: f64) -> Result<Vec<Bootcamp>> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(BootcampError::validation(
                "Distance must be a non-negative number of miles",
            ));
        }

        let results = self.geocoder.geocode(zipcode).await?;
        let origin = results
            .first()
            .ok_or_else(|| BootcampError::GeocodeNotFound {
                query: zipcode.to_string(),
            })?;

        let radius = miles_to_radians(distance);
        let filter = Filter::new().within_sphere(LOCATION_FIELD, origin.coordinates(), radius);
        let bootcamps = self.store.find(&FindQuery::matching(filter)).await?;

        tracing::info!(
            zipcode = zipcode,
            lat = origin.latitude,
            lon = origin.longitude,
            distance = distance,
            found = bootcamps.len(),
            "Radius search"
        );
        Ok(bootcamps)
    }

    /// Bulk-insert payloads (seeding). Nothing is inserted if any is invalid.
    pub async fn import(&self, payloads: Vec<Value>) -> Result<usize> {
        let bootcamps = payloads
            .into_iter()
            .map(new_bootcamp)
            .collect::<Result<Vec<_>>>()?;
        let inserted = self.store.insert_many(bootcamps).await?;
        tracing::info!(inserted = inserted, "Bootcamps imported");
        Ok(inserted)
    }

    /// Remove every bootcamp.
    pub async fn destroy(&self) -> Result<u64> {
        let removed = self.store.delete_all().await?;
        tracing::info!(removed = removed, "Bootcamps destroyed");
        Ok(removed)
    }

    /// Every bootcamp, newest first.
    pub async fn all(&self) -> Result<Vec<Bootcamp>> {
        self.store.find(&FindQuery::default()).await
    }

    /// Number of stored bootcamps.
    pub async fn count(&self) -> Result<u64> {
        self.store.count(&Filter::new()).await
    }

    /// Get geocoder cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.geocoder.cache_stats()
    }

    /// Get the maximum geocoder cache size.
    pub fn cache_capacity(&self) -> u64 {
        self.geocoder.cache_capacity()
    }
}

fn not_found(id: &str) -> BootcampError {
    BootcampError::NotFound { id: id.to_string() }
}

fn new_bootcamp(payload: Value) -> Result<Bootcamp> {
    BootcampInput::from_value(payload)?.into_bootcamp(uuid::Uuid::new_v4().to_string(), Utc::now())
}

/// Which geocoding provider to use.
#[derive(Debug, Clone)]
pub enum GeocoderConfig {
    /// Answers from a fixture file, or no answers at all.
    Static { fixtures: Option<PathBuf> },
    /// MapQuest Geocoding API.
    #[cfg(feature = "mapquest")]
    MapQuest(MapQuestConfig),
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig::Static { fixtures: None }
    }
}

/// Builder for creating [`BootcampService`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use bootcamp::BootcampServiceBuilder;
///
/// let service = BootcampServiceBuilder::from_env()?.build()?;
/// ```
pub struct BootcampServiceBuilder {
    data_file: Option<PathBuf>,
    geocoder: GeocoderConfig,
    cache_size: u64,
    store: Option<Arc<dyn BootcampStore>>,
    geocoder_override: Option<Arc<dyn Geocoder>>,
}

impl Default for BootcampServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BootcampServiceBuilder {
    /// An in-memory service with no geocoder fixtures.
    pub fn new() -> Self {
        Self {
            data_file: None,
            geocoder: GeocoderConfig::default(),
            cache_size: DEFAULT_CACHE_SIZE,
            store: None,
            geocoder_override: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BOOTCAMP_DATA_FILE` | JSON file persisting the collection | in-memory |
    /// | `BOOTCAMP_GEOCODER_PROVIDER` | `static` or `mapquest`* | `static` |
    /// | `BOOTCAMP_GEOCODER_API_KEY` | MapQuest key* | required for `mapquest` |
    /// | `BOOTCAMP_GEOCODER_FIXTURES` | JSON fixtures for `static` | none |
    /// | `BOOTCAMP_GEOCODER_CACHE_SIZE` | Cached geocoder queries | 1000 |
    ///
    /// *Only usable when the `mapquest` feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider, or for `mapquest` without an
    /// API key.
    pub fn from_env() -> Result<Self> {
        let data_file = std::env::var("BOOTCAMP_DATA_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cache_size: u64 = std::env::var("BOOTCAMP_GEOCODER_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);

        let provider = std::env::var("BOOTCAMP_GEOCODER_PROVIDER")
            .unwrap_or_else(|_| "static".to_string())
            .to_lowercase();

        let geocoder = match provider.as_str() {
            "static" | "" => GeocoderConfig::Static {
                fixtures: std::env::var("BOOTCAMP_GEOCODER_FIXTURES")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
            },
            #[cfg(feature = "mapquest")]
            "mapquest" => {
                let api_key = std::env::var("BOOTCAMP_GEOCODER_API_KEY").map_err(|_| {
                    BootcampError::Geocoder {
                        reason: "BOOTCAMP_GEOCODER_API_KEY environment variable not set"
                            .to_string(),
                    }
                })?;
                GeocoderConfig::MapQuest(MapQuestConfig::new(api_key))
            }
            other => {
                return Err(BootcampError::Geocoder {
                    reason: format!("Unsupported geocoder provider: {}", other),
                })
            }
        };

        Ok(Self {
            data_file,
            geocoder,
            cache_size,
            store: None,
            geocoder_override: None,
        })
    }

    /// Persist the collection to this JSON file.
    pub fn data_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Choose the geocoding provider.
    pub fn geocoder(mut self, config: GeocoderConfig) -> Self {
        self.geocoder = config;
        self
    }

    /// Set the maximum number of geocoder answers to keep in cache.
    ///
    /// Default is 1000 queries.
    pub fn geocoder_cache_size(mut self, size: u64) -> Self {
        self.cache_size = size;
        self
    }

    /// Use this store instead of the built-in one.
    pub fn store(mut self, store: Arc<dyn BootcampStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use this geocoder instead of the configured provider.
    pub fn geocoder_provider(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder_override = Some(geocoder);
        self
    }

    pub fn data_file_path(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Build the [`BootcampService`].
    ///
    /// # Errors
    ///
    /// Returns an error if the data file or fixtures cannot be read, or the
    /// HTTP geocoder cannot be created.
    pub fn build(self) -> Result<BootcampService> {
        let store: Arc<dyn BootcampStore> = match (self.store, &self.data_file) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(MemoryStore::open(path)?),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let provider: Arc<dyn Geocoder> = match self.geocoder_override {
            Some(geocoder) => geocoder,
            None => match self.geocoder {
                GeocoderConfig::Static { fixtures: Some(path) } => {
                    Arc::new(StaticGeocoder::from_file(path)?)
                }
                GeocoderConfig::Static { fixtures: None } => Arc::new(StaticGeocoder::new()),
                #[cfg(feature = "mapquest")]
                GeocoderConfig::MapQuest(config) => Arc::new(MapQuestGeocoder::new(config)?),
            },
        };

        Ok(BootcampService {
            store,
            geocoder: Arc::new(CachedGeocoder::new(provider, self.cache_size)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoder::GeocodeResult;
    use serde_json::json;
    use tempfile::TempDir;

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_entry("02118", GeocodeResult::new(42.3425, -71.0723))
            .with_entry("90001", GeocodeResult::new(33.9731, -118.2479))
    }

    fn service() -> BootcampService {
        BootcampServiceBuilder::new()
            .geocoder_provider(Arc::new(geocoder()))
            .build()
            .unwrap()
    }

    fn payload(name: &str, cost: u32, coords: Option<[f64; 2]>, created: &str) -> Value {
        let mut p = json!({
            "name": name,
            "description": format!("{name} description"),
            "averageCost": cost,
            "createdAt": created
        });
        if let Some(c) = coords {
            p["location"] = json!({ "type": "Point", "coordinates": c });
        }
        p
    }

    async fn seeded() -> BootcampService {
        let service = service();
        service
            .import(vec![
                payload("Devworks", 10000, Some([-71.104, 42.35]), "2024-01-01T00:00:00Z"),
                payload("ModernTech", 12000, Some([-71.4128, 41.824]), "2024-01-02T00:00:00Z"),
                payload("Codemasters", 8000, Some([-118.2437, 34.0522]), "2024-01-03T00:00:00Z"),
                payload("Devcentral", 5000, None, "2024-01-04T00:00:00Z"),
            ])
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let created = service
            .create(json!({ "bootcamp": payload("Devworks", 100, None, "2024-01-01T00:00:00Z") }))
            .await
            .unwrap();
        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.slug, "devworks");
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get("nope").await,
            Err(BootcampError::NotFound { .. })
        ));
        assert!(matches!(
            service.update("nope", json!({ "name": "x" })).await,
            Err(BootcampError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete("nope").await,
            Err(BootcampError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_requires_object() {
        let service = seeded().await;
        let id = service.all().await.unwrap()[0].id.clone();
        assert!(matches!(
            service.update(&id, json!([1, 2])).await,
            Err(BootcampError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_pagination_counts_filtered_total() {
        let service = seeded().await;

        let page = service
            .list(&ListQuery::parse("averageCost[gte]=8000&limit=2"))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert!(page.pagination.next.is_some());
        assert!(page.pagination.prev.is_none());

        let page = service
            .list(&ListQuery::parse("averageCost[gte]=8000&limit=2&page=2"))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.pagination.next.is_none());
        assert!(page.pagination.prev.is_some());
    }

    #[tokio::test]
    async fn test_list_select_and_sort() {
        let service = seeded().await;
        let page = service
            .list(&ListQuery::parse("select=name,averageCost&sort=averageCost"))
            .await
            .unwrap();
        let names: Vec<&str> = page
            .data
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Devcentral", "Codemasters", "Devworks", "ModernTech"]);
        assert!(page.data[0].get("description").is_none());
        assert!(page.data[0].get("id").is_some());
    }

    #[tokio::test]
    async fn test_list_default_order_is_newest_first() {
        let service = seeded().await;
        let default = service.list(&ListQuery::parse("")).await.unwrap();
        let explicit = service
            .list(&ListQuery::parse("sort=-createdAt"))
            .await
            .unwrap();
        assert_eq!(default.data, explicit.data);
        assert_eq!(default.data[0]["name"], "Devcentral");
    }

    #[tokio::test]
    async fn test_radius_search() {
        let service = seeded().await;

        // Devworks is ~2 miles from 02118, ModernTech ~41 miles.
        let near = service.within_radius("02118", 10.0).await.unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].name, "Devworks");

        let wider = service.within_radius("02118", 60.0).await.unwrap();
        assert_eq!(wider.len(), 2);

        let la = service.within_radius("90001", 15.0).await.unwrap();
        assert_eq!(la.len(), 1);
        assert_eq!(la[0].name, "Codemasters");
    }

    #[tokio::test]
    async fn test_radius_search_errors() {
        let service = seeded().await;
        assert!(matches!(
            service.within_radius("00000", 10.0).await,
            Err(BootcampError::GeocodeNotFound { .. })
        ));
        assert!(matches!(
            service.within_radius("02118", -1.0).await,
            Err(BootcampError::Validation { .. })
        ));
        assert!(matches!(
            service.within_radius("02118", f64::NAN).await,
            Err(BootcampError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_import_and_destroy() {
        let service = seeded().await;
        assert_eq!(service.count().await.unwrap(), 4);

        // One invalid payload rejects the whole batch.
        let result = service
            .import(vec![
                payload("Fresh", 1, None, "2024-02-01T00:00:00Z"),
                json!({ "name": "No description" }),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(service.count().await.unwrap(), 4);

        assert_eq!(service.destroy().await.unwrap(), 4);
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_builder_with_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bootcamps.json");

        let service = BootcampServiceBuilder::new().data_file(&path).build().unwrap();
        service
            .create(payload("Devworks", 1, None, "2024-01-01T00:00:00Z"))
            .await
            .unwrap();

        let reopened = BootcampServiceBuilder::new().data_file(&path).build().unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[test]
    fn test_from_env() {
        std::env::remove_var("BOOTCAMP_DATA_FILE");
        std::env::remove_var("BOOTCAMP_GEOCODER_CACHE_SIZE");
        std::env::remove_var("BOOTCAMP_GEOCODER_FIXTURES");
        std::env::set_var("BOOTCAMP_GEOCODER_PROVIDER", "static");

        let builder = BootcampServiceBuilder::from_env().unwrap();
        assert!(builder.data_file_path().is_none());
        assert_eq!(builder.cache_size, DEFAULT_CACHE_SIZE);

        std::env::set_var("BOOTCAMP_DATA_FILE", "/tmp/bootcamps.json");
        std::env::set_var("BOOTCAMP_GEOCODER_CACHE_SIZE", "50");
        let builder = BootcampServiceBuilder::from_env().unwrap();
        assert_eq!(
            builder.data_file_path(),
            Some(Path::new("/tmp/bootcamps.json"))
        );
        assert_eq!(builder.cache_size, 50);

        std::env::set_var("BOOTCAMP_GEOCODER_PROVIDER", "carrier-pigeon");
        assert!(BootcampServiceBuilder::from_env().is_err());

        std::env::remove_var("BOOTCAMP_DATA_FILE");
        std::env::remove_var("BOOTCAMP_GEOCODER_CACHE_SIZE");
        std::env::remove_var("BOOTCAMP_GEOCODER_PROVIDER");
    }
}
