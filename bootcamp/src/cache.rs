//! LRU caching for geocoder lookups.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;

use crate::error::Result;
use crate::geocoder::{normalize_query, GeocodeResult, Geocoder};

/// Default number of distinct queries kept in the cache.
pub const DEFAULT_CACHE_SIZE: u64 = 1000;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of queries currently in the cache.
    pub entry_count: u64,
    /// Number of lookups served from the cache.
    pub hit_count: u64,
    /// Number of lookups forwarded to the provider.
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// A [`Geocoder`] that remembers answers from another geocoder.
///
/// Empty answers are cached too; provider errors are not.
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Cache<String, Arc<Vec<GeocodeResult>>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl CachedGeocoder {
    /// Wrap `inner`, keeping up to `capacity` distinct queries.
    pub fn new(inner: Arc<dyn Geocoder>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(capacity).build(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.entry_count(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    /// Get the maximum cache size.
    pub fn cache_capacity(&self) -> u64 {
        self.cache.policy().max_capacity().unwrap_or(0)
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        let key = normalize_query(query);

        if let Some(results) = self.cache.get(&key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(results.as_ref().clone());
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let results = self.inner.geocode(query).await?;
        tracing::debug!(query = %key, results = results.len(), "Geocoder lookup");
        self.cache.insert(key, Arc::new(results.clone()));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootcampError;
    use crate::geocoder::StaticGeocoder;

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Vec<GeocodeResult>> {
            Err(BootcampError::Geocoder {
                reason: "unreachable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let inner =
            StaticGeocoder::new().with_entry("02118", GeocodeResult::new(42.3425, -71.0723));
        let geocoder = CachedGeocoder::new(Arc::new(inner), 10);

        // First query - cache miss
        geocoder.geocode("02118").await.unwrap();
        let stats = geocoder.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 0);

        // Same query, different spacing - cache hit
        let results = geocoder.geocode(" 02118").await.unwrap();
        assert_eq!(results.len(), 1);
        let stats = geocoder.cache_stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_empty_answers_are_cached() {
        let geocoder = CachedGeocoder::new(Arc::new(StaticGeocoder::new()), 10);
        assert!(geocoder.geocode("00000").await.unwrap().is_empty());
        assert!(geocoder.geocode("00000").await.unwrap().is_empty());
        assert_eq!(geocoder.cache_stats().hit_count, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let geocoder = CachedGeocoder::new(Arc::new(FailingGeocoder), 10);
        assert!(geocoder.geocode("02118").await.is_err());
        assert!(geocoder.geocode("02118").await.is_err());
        let stats = geocoder.cache_stats();
        assert_eq!(stats.miss_count, 2);
        assert_eq!(stats.hit_count, 0);
    }

    #[test]
    fn test_cache_capacity() {
        let geocoder = CachedGeocoder::new(Arc::new(StaticGeocoder::new()), 42);
        assert_eq!(geocoder.cache_capacity(), 42);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
