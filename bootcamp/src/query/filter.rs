//! Typed filter expressions.
//!
//! A [`Filter`] is a conjunction of [`Condition`]s. Each comparison names a
//! field path, an [`Operator`], and the raw query-string value(s); coercion to
//! the stored type happens at match time.

use std::cmp::Ordering;

use serde_json::Value;

use super::value::{compare_with_text, lookup};
use crate::geo::within_sphere;

/// Comparison operators accepted in bracketed query keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    /// Match an operator keyword as a whole token, ignoring case.
    ///
    /// `eq` is not a keyword: equality is what a plain key means.
    ///
    /// # Examples
    ///
    /// ```
    /// use bootcamp::query::Operator;
    ///
    /// assert_eq!(Operator::from_keyword("gte"), Some(Operator::Gte));
    /// assert_eq!(Operator::from_keyword("LT"), Some(Operator::Lt));
    /// assert_eq!(Operator::from_keyword("gtx"), None);
    /// ```
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq | Operator::In => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
        }
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
}

impl FilterValue {
    fn candidates(&self) -> &[String] {
        match self {
            FilterValue::Text(text) => std::slice::from_ref(text),
            FilterValue::List(values) => values,
        }
    }
}

/// A single `field <op> value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

impl Comparison {
    pub fn new(field: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    fn matches(&self, document: &Value) -> bool {
        match lookup(document, &self.field) {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => items.iter().any(|item| self.matches_scalar(item)),
            Some(stored) => self.matches_scalar(stored),
        }
    }

    fn matches_scalar(&self, stored: &Value) -> bool {
        self.value.candidates().iter().any(|text| {
            compare_with_text(stored, text).is_some_and(|ordering| self.operator.accepts(ordering))
        })
    }
}

/// Spatial condition: the point stored at `field` lies within `radius`
/// radians of `center` (`[longitude, latitude]`).
#[derive(Debug, Clone, PartialEq)]
pub struct SphereQuery {
    pub field: String,
    pub center: [f64; 2],
    pub radius: f64,
}

impl SphereQuery {
    fn matches(&self, document: &Value) -> bool {
        let Some(coordinates) = lookup(document, &self.field)
            .and_then(|location| location.get("coordinates"))
            .and_then(Value::as_array)
        else {
            return false;
        };
        match (
            coordinates.first().and_then(Value::as_f64),
            coordinates.get(1).and_then(Value::as_f64),
        ) {
            (Some(lon), Some(lat)) => within_sphere([lon, lat], self.center, self.radius),
            _ => false,
        }
    }
}

/// One clause of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare(Comparison),
    WithinSphere(SphereQuery),
}

impl Condition {
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Condition::Compare(comparison) => comparison.matches(document),
            Condition::WithinSphere(sphere) => sphere.matches(document),
        }
    }
}

/// A conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality/range/membership comparison.
    pub fn compare(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: FilterValue,
    ) -> Self {
        self.conditions
            .push(Condition::Compare(Comparison::new(field, operator, value)));
        self
    }

    /// Add a spatial "within sphere" condition.
    pub fn within_sphere(
        mut self,
        field: impl Into<String>,
        center: [f64; 2],
        radius: f64,
    ) -> Self {
        self.conditions.push(Condition::WithinSphere(SphereQuery {
            field: field.into(),
            center,
            radius,
        }));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check a document against every condition.
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::miles_to_radians;
    use serde_json::json;

    fn text(s: &str) -> FilterValue {
        FilterValue::Text(s.to_string())
    }

    fn doc() -> Value {
        json!({
            "name": "ModernTech Bootcamp",
            "averageCost": 10000,
            "housing": false,
            "careers": ["Web Development", "UI/UX"],
            "location": { "type": "Point", "coordinates": [-71.104, 42.35], "state": "MA" }
        })
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&doc()));
    }

    #[test]
    fn test_range_operators() {
        let d = doc();
        assert!(Filter::new().compare("averageCost", Operator::Gt, text("9999")).matches(&d));
        assert!(!Filter::new().compare("averageCost", Operator::Gt, text("10000")).matches(&d));
        assert!(Filter::new().compare("averageCost", Operator::Gte, text("10000")).matches(&d));
        assert!(Filter::new().compare("averageCost", Operator::Lte, text("10000")).matches(&d));
        assert!(!Filter::new().compare("averageCost", Operator::Lt, text("10000")).matches(&d));
    }

    #[test]
    fn test_conjunction() {
        let filter = Filter::new()
            .compare("averageCost", Operator::Gte, text("5000"))
            .compare("averageCost", Operator::Lte, text("8000"));
        assert!(!filter.matches(&doc()));
    }

    #[test]
    fn test_array_field_matches_any_element() {
        let d = doc();
        assert!(Filter::new().compare("careers", Operator::Eq, text("UI/UX")).matches(&d));
        assert!(Filter::new()
            .compare(
                "careers",
                Operator::In,
                FilterValue::List(vec!["Business".into(), "Web Development".into()])
            )
            .matches(&d));
        assert!(!Filter::new().compare("careers", Operator::Eq, text("Business")).matches(&d));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let d = doc();
        assert!(!Filter::new().compare("averageRating", Operator::Lt, text("100")).matches(&d));
    }

    #[test]
    fn test_nested_and_bool_fields() {
        let d = doc();
        assert!(Filter::new().compare("location.state", Operator::Eq, text("MA")).matches(&d));
        assert!(Filter::new().compare("housing", Operator::Eq, text("false")).matches(&d));
    }

    #[test]
    fn test_within_sphere() {
        let d = doc();
        let boston = [-71.0589, 42.3601];
        assert!(Filter::new().within_sphere("location", boston, miles_to_radians(10.0)).matches(&d));
        assert!(!Filter::new().within_sphere("location", boston, miles_to_radians(1.0)).matches(&d));
        assert!(!Filter::new()
            .within_sphere("location", boston, 1.0)
            .matches(&json!({ "name": "no location" })));
    }
}
