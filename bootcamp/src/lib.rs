//! # Bootcamp - Directory Library
//!
//! Storage, query translation and radius search for a directory of coding
//! bootcamps. The HTTP service and the command-line tool are thin layers over
//! this crate.
//!
//! ## Features
//!
//! - **Query translation**: URL parameters such as `averageCost[lte]=10000`,
//!   `select=name`, `sort=-averageCost` and `page=2&limit=5` become a typed
//!   [`ListQuery`]
//! - **Radius search**: postal code plus distance in miles, matched on the
//!   sphere
//! - **Persistence**: in memory, optionally mirrored to a JSON file
//! - **Geocoding**: pluggable [`Geocoder`] with an LRU cache in front
//!
//! ## Quick Start
//!
//! ```ignore
//! use bootcamp::{BootcampServiceBuilder, ListQuery};
//! use serde_json::json;
//!
//! let service = BootcampServiceBuilder::new().build()?;
//! service.create(json!({ "name": "Devworks", "description": "Full stack" })).await?;
//!
//! let page = service.list(&ListQuery::parse("select=name&sort=name")).await?;
//! println!("{} bootcamps", page.total);
//! ```
//!
//! ## Cargo Features
//!
//! - `mapquest`: [`mapquest::MapQuestGeocoder`], backed by the MapQuest API
//! - `geojson`: [`geojson`] export of bootcamp locations

pub mod cache;
pub mod error;
pub mod geo;
pub mod geocoder;
pub mod model;
pub mod query;
pub mod service;
pub mod store;

#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(feature = "mapquest")]
pub mod mapquest;

// Re-export main types at crate root for convenience
pub use cache::{CacheStats, CachedGeocoder};
pub use error::{BootcampError, Result};
pub use geocoder::{GeocodeResult, Geocoder, StaticGeocoder};
pub use model::{Bootcamp, BootcampInput, Career, Location};
pub use query::{FindQuery, ListQuery};
pub use service::{BootcampService, BootcampServiceBuilder, GeocoderConfig, ListPage};
pub use store::{BootcampStore, MemoryStore};
