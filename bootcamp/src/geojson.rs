//! GeoJSON export of bootcamp locations.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use bootcamp::geojson::to_feature_collection;
//!
//! let collection = to_feature_collection(&bootcamps);
//! std::fs::write("bootcamps.geojson", serde_json::to_string(&collection)?)?;
//! ```

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::Value;

use crate::model::Bootcamp;

/// Properties copied onto each feature.
const FEATURE_PROPERTIES: [&str; 6] = [
    "name",
    "slug",
    "address",
    "careers",
    "averageCost",
    "averageRating",
];

/// Build a point feature for a bootcamp.
///
/// Returns `None` if the bootcamp has no location.
pub fn to_feature(bootcamp: &Bootcamp) -> Option<Feature> {
    let location = bootcamp.location.as_ref()?;
    let geometry = Geometry::new(GeoJsonValue::Point(vec![
        location.longitude(),
        location.latitude(),
    ]));

    let document = serde_json::to_value(bootcamp).ok()?;
    let mut properties = JsonObject::new();
    for key in FEATURE_PROPERTIES {
        if let Some(value) = document.get(key).filter(|v| !v.is_null()) {
            properties.insert(key.to_string(), value.clone());
        }
    }
    if let Some(city) = &location.city {
        properties.insert("city".to_string(), Value::String(city.clone()));
    }

    Some(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(bootcamp.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Collect every located bootcamp into a feature collection.
///
/// Bootcamps without a location are skipped.
pub fn to_feature_collection(bootcamps: &[Bootcamp]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: bootcamps.iter().filter_map(to_feature).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BootcampInput, Location};
    use chrono::Utc;
    use serde_json::json;

    fn bootcamp(id: &str, location: Option<Location>) -> Bootcamp {
        let mut b = BootcampInput::from_value(json!({
            "name": format!("Bootcamp {id}"),
            "description": "desc",
            "careers": ["Business"],
            "averageCost": 7500
        }))
        .unwrap()
        .into_bootcamp(id.to_string(), Utc::now())
        .unwrap();
        b.location = location;
        b
    }

    #[test]
    fn test_point_feature() {
        let mut location = Location::point(-71.104, 42.35);
        location.city = Some("Boston".to_string());
        let feature = to_feature(&bootcamp("a", Some(location))).unwrap();

        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"], json!([-71.104, 42.35]));
        assert_eq!(json["id"], "a");
        assert_eq!(json["properties"]["name"], "Bootcamp a");
        assert_eq!(json["properties"]["city"], "Boston");
        assert_eq!(json["properties"]["careers"], json!(["Business"]));
        assert!(json["properties"].get("averageRating").is_none());
    }

    #[test]
    fn test_collection_skips_unlocated() {
        let collection = to_feature_collection(&[
            bootcamp("a", Some(Location::point(0.0, 0.0))),
            bootcamp("b", None),
        ]);
        assert_eq!(collection.features.len(), 1);
    }
}
