//! Field selection.

use serde_json::{Map, Value};

use super::value::lookup;

/// Which fields of a document to return.
///
/// Inclusion mode keeps only the listed fields (plus `id`); a list made only
/// of `-field` entries removes those fields instead. An empty projection
/// returns documents unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Projection {
    /// Parse a comma-separated field list.
    ///
    /// # Examples
    ///
    /// ```
    /// use bootcamp::query::Projection;
    /// use serde_json::json;
    ///
    /// let projection = Projection::parse("name,description");
    /// let doc = json!({ "id": "1", "name": "a", "description": "b", "phone": "c" });
    /// assert_eq!(
    ///     projection.apply(&doc),
    ///     json!({ "id": "1", "name": "a", "description": "b" })
    /// );
    /// ```
    pub fn parse(input: &str) -> Self {
        let mut projection = Self::default();
        for field in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match field.strip_prefix('-') {
                Some(excluded) if !excluded.is_empty() => {
                    projection.exclude.push(excluded.to_string())
                }
                Some(_) => {}
                None => projection.include.push(field.to_string()),
            }
        }
        projection
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Fields explicitly requested.
    pub fn fields(&self) -> &[String] {
        &self.include
    }

    /// Apply the projection to a document.
    pub fn apply(&self, document: &Value) -> Value {
        if !self.include.is_empty() {
            let mut out = Map::new();
            if let Some(id) = document.get("id") {
                out.insert("id".to_string(), id.clone());
            }
            for field in &self.include {
                if let Some(value) = lookup(document, field) {
                    insert_path(&mut out, field, value.clone());
                }
            }
            return Value::Object(out);
        }

        let mut out = document.clone();
        for field in &self.exclude {
            if field != "id" {
                remove_path(&mut out, field);
            }
        }
        out
    }
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

fn remove_path(target: &mut Value, path: &str) {
    let Value::Object(map) = target else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.remove(path);
        }
        Some((head, rest)) => {
            if let Some(child) = map.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "id": "abc",
            "name": "Devworks",
            "phone": "111",
            "location": { "city": "Boston", "state": "MA" }
        })
    }

    #[test]
    fn test_empty_projection_is_identity() {
        assert_eq!(Projection::parse("").apply(&doc()), doc());
    }

    #[test]
    fn test_nested_inclusion() {
        let projection = Projection::parse("location.city");
        assert_eq!(
            projection.apply(&doc()),
            json!({ "id": "abc", "location": { "city": "Boston" } })
        );
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let projection = Projection::parse("name,nope");
        assert_eq!(
            projection.apply(&doc()),
            json!({ "id": "abc", "name": "Devworks" })
        );
    }

    #[test]
    fn test_exclusion() {
        let projection = Projection::parse("-phone,-location.state,-id");
        assert_eq!(
            projection.apply(&doc()),
            json!({ "id": "abc", "name": "Devworks", "location": { "city": "Boston" } })
        );
    }
}
