//! The bootcamp document model.
//!
//! A [`Bootcamp`] is always valid once constructed: every path that produces
//! one (create, patch, import) goes through [`BootcampInput::into_bootcamp`],
//! which runs the schema validation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BootcampError, Result};

/// Maximum length of a bootcamp name.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length of a bootcamp description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum length of a phone number.
pub const MAX_PHONE_LEN: usize = 20;

/// Photo used when none is supplied.
pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Fields a client may never set through a patch.
const IMMUTABLE_FIELDS: [&str; 3] = ["id", "createdAt", "slug"];

/// Career tracks a bootcamp can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Other")]
    Other,
}

impl Career {
    /// The label used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

impl fmt::Display for Career {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GeoJSON point with optional address components.
///
/// Coordinates are stored in GeoJSON order: `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// GeoJSON geometry type. Only `"Point"` is accepted.
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    /// `[longitude, latitude]` in decimal degrees.
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl Location {
    /// Create a bare point from longitude and latitude.
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: point_type(),
            coordinates: [longitude, latitude],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Check that this is a point with in-range coordinates.
    pub fn is_valid(&self) -> bool {
        let (lon, lat) = (self.longitude(), self.latitude());
        self.kind == "Point"
            && lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat)
    }
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

/// A stored bootcamp document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Vec<Career>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    /// Serialize to a JSON document, the shape filters and projections work on.
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Merge a partial update into this document and re-run validation.
    ///
    /// Top-level keys in `patch` replace the stored values; a `null` clears an
    /// optional field. `id`, `createdAt` and `slug` are never taken from the
    /// patch. The receiver is left untouched if the merged document is invalid.
    pub fn apply_patch(&self, patch: &Map<String, Value>) -> Result<Bootcamp> {
        let mut document = match self.to_document()? {
            Value::Object(map) => map,
            _ => return Err(BootcampError::validation("Stored document is not an object")),
        };

        for (key, value) in patch {
            if IMMUTABLE_FIELDS.contains(&key.as_str()) {
                continue;
            }
            document.insert(key.clone(), value.clone());
        }
        document.remove("id");
        document.remove("slug");

        let input = BootcampInput::from_value(Value::Object(document))?;
        input.into_bootcamp(self.id.clone(), self.created_at)
    }

    /// Collect every schema violation in this document.
    pub fn validate(&self) -> Result<()> {
        let mut messages = Vec::new();

        if self.name.is_empty() {
            messages.push("Please add a name".to_string());
        } else if self.name.chars().count() > MAX_NAME_LEN {
            messages.push(format!(
                "Name can not be more than {} characters",
                MAX_NAME_LEN
            ));
        }

        if self.description.is_empty() {
            messages.push("Please add a description".to_string());
        } else if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            messages.push(format!(
                "Description can not be more than {} characters",
                MAX_DESCRIPTION_LEN
            ));
        }

        if let Some(website) = &self.website {
            if !is_http_url(website) {
                messages.push("Please use a valid URL with HTTP or HTTPS".to_string());
            }
        }

        if let Some(phone) = &self.phone {
            if phone.chars().count() > MAX_PHONE_LEN {
                messages.push(format!(
                    "Phone number can not be longer than {} characters",
                    MAX_PHONE_LEN
                ));
            }
        }

        if let Some(email) = &self.email {
            if !is_email(email) {
                messages.push("Please add a valid email".to_string());
            }
        }

        if let Some(location) = &self.location {
            if !location.is_valid() {
                messages.push(
                    "Location must be a GeoJSON Point with [longitude, latitude] coordinates"
                        .to_string(),
                );
            }
        }

        if let Some(rating) = self.average_rating {
            if !rating.is_finite() || rating < 1.0 {
                messages.push("Rating must be at least 1".to_string());
            } else if rating > 10.0 {
                messages.push("Rating can not be more than 10".to_string());
            }
        }

        if let Some(cost) = self.average_cost {
            if !cost.is_finite() || cost < 0.0 {
                messages.push("Average cost can not be negative".to_string());
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(BootcampError::Validation { messages })
        }
    }
}

/// A client-submitted bootcamp payload, before an id is assigned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Option<Vec<Career>>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_cost: Option<f64>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub housing: Option<bool>,
    #[serde(default)]
    pub job_assistance: Option<bool>,
    #[serde(default)]
    pub job_guarantee: Option<bool>,
    #[serde(default)]
    pub accept_gi: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BootcampInput {
    /// Decode a payload, accepting both `{...}` and `{"bootcamp": {...}}`.
    ///
    /// Type mismatches (a string where a number belongs, an unknown career)
    /// are reported as validation failures.
    pub fn from_value(payload: Value) -> Result<Self> {
        let payload = unwrap_envelope(payload);
        if !payload.is_object() {
            return Err(BootcampError::validation(
                "Request body must be a JSON object",
            ));
        }
        serde_json::from_value(payload).map_err(|e| BootcampError::validation(e.to_string()))
    }

    /// Assign identity and defaults, then validate.
    ///
    /// `created_at` is used only when the payload does not carry its own
    /// `createdAt`.
    pub fn into_bootcamp(self, id: String, created_at: DateTime<Utc>) -> Result<Bootcamp> {
        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        let bootcamp = Bootcamp {
            id,
            slug: slug::slugify(&name),
            name,
            description: self.description.unwrap_or_default(),
            website: self.website,
            phone: self.phone,
            email: self.email,
            address: self.address,
            location: self.location,
            careers: self.careers.unwrap_or_default(),
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            photo: self.photo.unwrap_or_else(default_photo),
            housing: self.housing.unwrap_or(false),
            job_assistance: self.job_assistance.unwrap_or(false),
            job_guarantee: self.job_guarantee.unwrap_or(false),
            accept_gi: self.accept_gi.unwrap_or(false),
            created_at: self.created_at.unwrap_or(created_at),
        };
        bootcamp.validate()?;
        Ok(bootcamp)
    }
}

/// Strip the `{"bootcamp": ...}` wrapper if present.
pub fn unwrap_envelope(payload: Value) -> Value {
    match payload {
        Value::Object(mut map)
            if map.len() == 1 && map.get("bootcamp").is_some_and(Value::is_object) =>
        {
            map.remove("bootcamp").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> Value {
        json!({
            "name": "Devworks Bootcamp",
            "description": "Devworks is a full stack JavaScript Bootcamp",
            "website": "https://devworks.com",
            "phone": "(111) 111-1111",
            "email": "enroll@devworks.com",
            "careers": ["Web Development", "UI/UX", "Business"],
            "housing": true
        })
    }

    #[test]
    fn test_input_defaults_and_slug() {
        let input = BootcampInput::from_value(valid_input()).unwrap();
        let bootcamp = input.into_bootcamp("id-1".to_string(), Utc::now()).unwrap();

        assert_eq!(bootcamp.slug, "devworks-bootcamp");
        assert_eq!(bootcamp.photo, DEFAULT_PHOTO);
        assert!(bootcamp.housing);
        assert!(!bootcamp.accept_gi);
        assert_eq!(bootcamp.careers.len(), 3);
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let wrapped = json!({ "bootcamp": valid_input() });
        let input = BootcampInput::from_value(wrapped).unwrap();
        assert_eq!(input.name.as_deref(), Some("Devworks Bootcamp"));
    }

    #[test]
    fn test_missing_required_fields() {
        let input = BootcampInput::from_value(json!({})).unwrap();
        let err = input
            .into_bootcamp("id".to_string(), Utc::now())
            .unwrap_err();
        match err {
            BootcampError::Validation { messages } => {
                assert!(messages.contains(&"Please add a name".to_string()));
                assert!(messages.contains(&"Please add a description".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut payload = valid_input();
        payload["website"] = json!("ftp://devworks.com");
        payload["email"] = json!("not-an-email");
        payload["averageRating"] = json!(11);
        payload["location"] = json!({ "type": "Point", "coordinates": [-200.0, 42.0] });

        let err = BootcampInput::from_value(payload)
            .unwrap()
            .into_bootcamp("id".to_string(), Utc::now())
            .unwrap_err();
        match err {
            BootcampError::Validation { messages } => assert_eq!(messages.len(), 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_career_is_validation_error() {
        let mut payload = valid_input();
        payload["careers"] = json!(["Underwater Basket Weaving"]);
        assert!(matches!(
            BootcampInput::from_value(payload),
            Err(BootcampError::Validation { .. })
        ));
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let created = Utc::now();
        let bootcamp = BootcampInput::from_value(valid_input())
            .unwrap()
            .into_bootcamp("id-1".to_string(), created)
            .unwrap();

        let patch = json!({
            "id": "hijacked",
            "name": "Devworks Academy",
            "averageCost": 9000,
            "website": null
        });
        let updated = bootcamp.apply_patch(patch.as_object().unwrap()).unwrap();

        assert_eq!(updated.id, "id-1");
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.slug, "devworks-academy");
        assert_eq!(updated.average_cost, Some(9000.0));
        assert_eq!(updated.website, None);
        assert_eq!(updated.email, bootcamp.email);
    }

    #[test]
    fn test_apply_patch_revalidates() {
        let bootcamp = BootcampInput::from_value(valid_input())
            .unwrap()
            .into_bootcamp("id-1".to_string(), Utc::now())
            .unwrap();
        let patch = json!({ "averageRating": 0 });
        assert!(bootcamp.apply_patch(patch.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_location_serializes_in_geojson_order() {
        let location = Location::point(-71.104, 42.35);
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], -71.104);
        assert_eq!(json["coordinates"][1], 42.35);
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("enroll@devworks.com"));
        assert!(!is_email("enroll@devworks"));
        assert!(!is_email("@devworks.com"));
        assert!(!is_email("en roll@devworks.com"));
    }
}
